mod data;
mod health;

macros_utils::routes! {
    module health,
    module data,
}
