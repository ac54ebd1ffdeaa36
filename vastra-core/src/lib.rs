pub mod carrier;
pub mod error;
pub mod notify;
pub mod repository;

pub use carrier::{AddressParser, CarrierGateway, ParsedAddress};
pub use error::{CarrierError, NotifyError, ShippingError};
pub use notify::Notifier;
pub use repository::OrderRepository;
