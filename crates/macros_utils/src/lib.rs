//! Small declarative helpers shared by the HTTP apps.

#[cfg(feature = "actix")]
#[doc(hidden)]
pub use actix_web;

/// Generate a `pub fn routes(cfg: &mut ServiceConfig)` registering handlers
/// and nested route modules.
///
/// ```ignore
/// macros_utils::routes! {
///     route health_route,
///     module data,
/// }
/// ```
///
/// `route` entries are actix handlers (`cfg.service(..)`), `module` entries
/// are sibling modules that expose their own `routes` function.
#[cfg(feature = "actix")]
#[macro_export]
macro_rules! routes {
    ($($kind:ident $item:ident),* $(,)?) => {
        pub fn routes(cfg: &mut $crate::actix_web::web::ServiceConfig) {
            $($crate::__route_entry!(cfg, $kind $item);)*
        }
    };
}

#[cfg(feature = "actix")]
#[doc(hidden)]
#[macro_export]
macro_rules! __route_entry {
    ($cfg:ident, route $item:ident) => {
        $cfg.service($item);
    };
    ($cfg:ident, module $item:ident) => {
        $cfg.configure($item::routes);
    };
}
