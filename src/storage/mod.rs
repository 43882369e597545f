pub mod json_store;

pub use json_store::{
    JsonRideStore, StoredRide, RIDE_SOURCE_EXTERNAL_WIZARD, RIDE_SOURCE_RECEIPT_IMPORT,
};
