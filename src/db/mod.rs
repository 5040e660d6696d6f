pub mod connection;

pub use connection::{connect_to_database, mask_url_password};
