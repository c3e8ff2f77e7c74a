pub mod sync_services;
