use actix_web::{HttpResponse, Responder, get};

macros_utils::routes! {
    route health_route,
}

/// Health check route
/// This route returns no content, the response status is enough.
#[get("/")]
pub async fn health_route() -> impl Responder {
    HttpResponse::Ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test};

    #[actix_web::test]
    async fn test_health_is_ok() {
        let app = test::init_service(App::new().configure(routes)).await;

        let response = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

        assert!(response.status().is_success());
    }
}
