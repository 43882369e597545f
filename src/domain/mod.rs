//! Ride vocabulary shared by the wizard, the importers and the stores.

pub mod common;
pub mod draft;
pub mod ride;

pub use common::{parse_choice, Choice, Displayable};
pub use draft::{DraftField, ExternalRideInput, RideDraft};
pub use ride::{PaymentMethod, RequestSource, TimeOfDay, TripReason};
