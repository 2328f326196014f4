mod address;
mod contact;
mod county;
mod delivery_stop;
mod material_type;
mod payment_method;
mod quote_record;
mod rental_period;
mod service_area;
mod size_class;

pub use address::{AddressComponents, COUNTY_COMPONENT, Coordinates, DeliveryAddress};
pub use contact::ContactInfo;
pub use county::County;
pub use delivery_stop::{DeliveryStop, TimeSlot};
pub use material_type::MaterialType;
pub use payment_method::PaymentMethod;
pub use quote_record::{NewQuoteRecord, QuoteRecord, QuoteStatus};
pub use rental_period::RentalPeriod;
pub use service_area::ServiceArea;
pub use size_class::SizeClass;
