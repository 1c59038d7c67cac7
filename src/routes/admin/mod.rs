mod billing;
mod clients;
mod commitments;
mod helpers;
mod lookups;
mod notifications;
mod payments;
mod receipts;
mod status;
mod templates;
mod users;

pub use billing::*;
pub use clients::*;
pub use commitments::*;
pub use lookups::*;
pub use notifications::*;
pub use payments::*;
pub use receipts::*;
pub use status::*;
pub use templates::*;
pub use users::*;
