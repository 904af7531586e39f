//! Fulfillment routing and POS integration
//!
//! After an order is paid it has to reach the right legacy back-office
//! tenant with that tenant's product and presentation codes. This module
//! owns the branch routing table, the price/presentation matrices, the
//! wire-format translator, and the upload client.

pub mod error;
pub mod pricing;
pub mod routing;
pub mod translator;
pub mod uploader;

pub use error::FulfillmentError;
pub use pricing::{
    check_rosca_window, legacy_presentation_id, presentation_discount, presentation_price,
    special_date_kind, Category, Presentation, SpecialDateKind, SpecialIdPair, SpecialSystemIds,
};
pub use routing::{Brand, BranchPolicy, CutoffPolicy, RoutingTable};
pub use translator::{payment_method_code, translate, SystemOrder, SystemOrderLine};
pub use uploader::SystemUploader;
