// msgmark state managers
// Managers own persisted state; the bookmark store is the only one.

pub mod bookmark_manager;
