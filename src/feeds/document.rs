//! Feed document encoding.
//!
//! A feed is an `AmazonEnvelope` holding a header, the message type and a
//! sequence of `Message` elements of exactly that type. Message ids are
//! assigned at encode time, starting at 1.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use serde::Serialize;

use crate::feeds::EncodingError;

/// `DocumentVersion` written in every feed header.
pub const DOCUMENT_VERSION: &str = "1.01";

const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str = "amzn-envelope.xsd";

/// The kind of messages carried by a feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeedKind {
    /// Order acknowledgements.
    Acknowledgement,
    /// Order fulfillment (shipping) data.
    Fulfillment,
    /// Inventory availability updates.
    Inventory,
    /// Price updates.
    Price,
}

impl FeedKind {
    /// Returns the `FeedType` request parameter for this kind.
    #[must_use]
    pub const fn feed_type(&self) -> &'static str {
        match self {
            Self::Acknowledgement => "_POST_ORDER_ACKNOWLEDGEMENT_DATA_",
            Self::Fulfillment => "_POST_ORDER_FULFILLMENT_DATA_",
            Self::Inventory => "_POST_INVENTORY_AVAILABILITY_DATA_",
            Self::Price => "_POST_PRODUCT_PRICING_DATA_",
        }
    }

    /// Returns the `MessageType` written in the document.
    #[must_use]
    pub const fn message_type(&self) -> &'static str {
        match self {
            Self::Acknowledgement => "OrderAcknowledgement",
            Self::Fulfillment => "OrderFulfillment",
            Self::Inventory => "Inventory",
            Self::Price => "Price",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message_type())
    }
}

/// Acknowledges receipt of an order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OrderAcknowledgement {
    /// The order being acknowledged.
    #[serde(rename = "AmazonOrderID")]
    pub amazon_order_id: String,
    /// Always `Success`.
    #[serde(rename = "StatusCode")]
    pub status_code: String,
}

impl OrderAcknowledgement {
    /// Creates a successful acknowledgement for `order_id`.
    #[must_use]
    pub fn success(order_id: impl Into<String>) -> Self {
        Self {
            amazon_order_id: order_id.into(),
            status_code: "Success".to_string(),
        }
    }
}

/// Carrier and tracking number of a shipment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FulfillmentData {
    /// Carrier name (e.g., `UPS`).
    #[serde(rename = "CarrierCode")]
    pub carrier_code: String,
    /// Tracking number.
    #[serde(rename = "ShipperTrackingNumber")]
    pub shipper_tracking_number: String,
}

/// One shipped order item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FulfillmentItem {
    /// The order item id.
    #[serde(rename = "AmazonOrderItemCode")]
    pub amazon_order_item_code: String,
    /// Shipped quantity.
    #[serde(rename = "Quantity")]
    pub quantity: u32,
}

/// Shipping data that completes an order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OrderFulfillment {
    /// The fulfilled order.
    #[serde(rename = "AmazonOrderID")]
    pub amazon_order_id: String,
    /// Shipment date, ISO-8601.
    #[serde(rename = "FulfillmentDate")]
    pub fulfillment_date: String,
    /// Carrier and tracking number.
    #[serde(rename = "FulfillmentData")]
    pub fulfillment_data: FulfillmentData,
    /// Shipped items. Empty means the whole order shipped.
    #[serde(rename = "Item")]
    pub items: Vec<FulfillmentItem>,
}

/// New available quantity for a SKU.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InventoryUpdate {
    /// Seller SKU.
    #[serde(rename = "SKU")]
    pub sku: String,
    /// Available quantity.
    #[serde(rename = "Quantity")]
    pub quantity: u32,
}

impl InventoryUpdate {
    /// Creates an inventory update.
    #[must_use]
    pub fn new(sku: impl Into<String>, quantity: u32) -> Self {
        Self {
            sku: sku.into(),
            quantity,
        }
    }
}

/// New standard price for a SKU.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceUpdate {
    /// Seller SKU.
    pub sku: String,
    /// Price amount.
    pub amount: f64,
    /// ISO currency code, `USD` unless set.
    pub currency: String,
}

impl PriceUpdate {
    /// Creates a price update in `USD`.
    #[must_use]
    pub fn new(sku: impl Into<String>, amount: f64) -> Self {
        Self {
            sku: sku.into(),
            amount,
            currency: "USD".to_string(),
        }
    }

    /// Sets the currency.
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }
}

/// A single feed message of any kind.
#[derive(Clone, Debug, PartialEq)]
pub enum FeedMessage {
    /// An order acknowledgement.
    Acknowledgement(OrderAcknowledgement),
    /// An order fulfillment.
    Fulfillment(OrderFulfillment),
    /// An inventory update.
    Inventory(InventoryUpdate),
    /// A price update.
    Price(PriceUpdate),
}

impl FeedMessage {
    /// Returns the kind of this message.
    #[must_use]
    pub const fn kind(&self) -> FeedKind {
        match self {
            Self::Acknowledgement(_) => FeedKind::Acknowledgement,
            Self::Fulfillment(_) => FeedKind::Fulfillment,
            Self::Inventory(_) => FeedKind::Inventory,
            Self::Price(_) => FeedKind::Price,
        }
    }
}

/// The messages of one feed, all of the same kind.
///
/// # Example
///
/// ```rust
/// use mws_api::feeds::{FeedKind, FeedMessage, FeedMessages, InventoryUpdate, PriceUpdate};
///
/// let messages = FeedMessages::from_messages([
///     FeedMessage::Inventory(InventoryUpdate::new("SKU-1", 3)),
///     FeedMessage::Inventory(InventoryUpdate::new("SKU-2", 0)),
/// ])
/// .unwrap();
/// assert_eq!(messages.kind(), FeedKind::Inventory);
/// assert_eq!(messages.len(), 2);
///
/// let mixed = FeedMessages::from_messages([
///     FeedMessage::Inventory(InventoryUpdate::new("SKU-1", 3)),
///     FeedMessage::Price(PriceUpdate::new("SKU-1", 9.99)),
/// ]);
/// assert!(mixed.is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum FeedMessages {
    /// Order acknowledgements.
    Acknowledgements(Vec<OrderAcknowledgement>),
    /// Order fulfillments.
    Fulfillments(Vec<OrderFulfillment>),
    /// Inventory updates.
    Inventory(Vec<InventoryUpdate>),
    /// Price updates.
    Prices(Vec<PriceUpdate>),
}

impl FeedMessages {
    /// Acknowledges each order id with `Success`.
    #[must_use]
    pub fn acknowledgements<I, S>(order_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Acknowledgements(
            order_ids
                .into_iter()
                .map(OrderAcknowledgement::success)
                .collect(),
        )
    }

    /// Groups individual messages into one feed.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError::NoFeedMessages`] if `messages` is empty, or
    /// [`EncodingError::MixedMessageKinds`] if they are not all of one kind.
    pub fn from_messages<I>(messages: I) -> Result<Self, EncodingError>
    where
        I: IntoIterator<Item = FeedMessage>,
    {
        let mut iter = messages.into_iter();
        let first = iter.next().ok_or(EncodingError::NoFeedMessages)?;
        let expected = first.kind();

        let mut grouped = match first {
            FeedMessage::Acknowledgement(m) => Self::Acknowledgements(vec![m]),
            FeedMessage::Fulfillment(m) => Self::Fulfillments(vec![m]),
            FeedMessage::Inventory(m) => Self::Inventory(vec![m]),
            FeedMessage::Price(m) => Self::Prices(vec![m]),
        };

        for message in iter {
            match (&mut grouped, message) {
                (Self::Acknowledgements(list), FeedMessage::Acknowledgement(m)) => list.push(m),
                (Self::Fulfillments(list), FeedMessage::Fulfillment(m)) => list.push(m),
                (Self::Inventory(list), FeedMessage::Inventory(m)) => list.push(m),
                (Self::Prices(list), FeedMessage::Price(m)) => list.push(m),
                (_, other) => {
                    return Err(EncodingError::MixedMessageKinds {
                        expected,
                        found: other.kind(),
                    })
                }
            }
        }
        Ok(grouped)
    }

    /// Returns the kind of the messages.
    #[must_use]
    pub const fn kind(&self) -> FeedKind {
        match self {
            Self::Acknowledgements(_) => FeedKind::Acknowledgement,
            Self::Fulfillments(_) => FeedKind::Fulfillment,
            Self::Inventory(_) => FeedKind::Inventory,
            Self::Prices(_) => FeedKind::Price,
        }
    }

    /// Returns the number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Acknowledgements(list) => list.len(),
            Self::Fulfillments(list) => list.len(),
            Self::Inventory(list) => list.len(),
            Self::Prices(list) => list.len(),
        }
    }

    /// Returns `true` if there are no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<OrderAcknowledgement>> for FeedMessages {
    fn from(messages: Vec<OrderAcknowledgement>) -> Self {
        Self::Acknowledgements(messages)
    }
}

impl From<Vec<OrderFulfillment>> for FeedMessages {
    fn from(messages: Vec<OrderFulfillment>) -> Self {
        Self::Fulfillments(messages)
    }
}

impl From<Vec<InventoryUpdate>> for FeedMessages {
    fn from(messages: Vec<InventoryUpdate>) -> Self {
        Self::Inventory(messages)
    }
}

impl From<Vec<PriceUpdate>> for FeedMessages {
    fn from(messages: Vec<PriceUpdate>) -> Self {
        Self::Prices(messages)
    }
}

/// An encoded feed and the checksum of its exact bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedBody {
    kind: FeedKind,
    bytes: Bytes,
    content_md5: String,
}

impl FeedBody {
    /// Returns the feed kind.
    #[must_use]
    pub const fn kind(&self) -> FeedKind {
        self.kind
    }

    /// Returns the document bytes, exactly as they are transmitted.
    #[must_use]
    pub const fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Returns base64(MD5(bytes)), sent as `ContentMD5Value`.
    #[must_use]
    pub fn content_md5(&self) -> &str {
        &self.content_md5
    }
}

/// Returns the base64-encoded MD5 digest of `bytes`.
#[must_use]
pub fn content_md5(bytes: &[u8]) -> String {
    STANDARD.encode(*md5::compute(bytes))
}

#[derive(Serialize)]
struct Header<'a> {
    #[serde(rename = "DocumentVersion")]
    document_version: &'static str,
    #[serde(rename = "MerchantIdentifier")]
    merchant_identifier: &'a str,
}

#[derive(Serialize)]
struct AcknowledgementMessage<'a> {
    #[serde(rename = "MessageID")]
    message_id: usize,
    #[serde(rename = "OrderAcknowledgement")]
    payload: &'a OrderAcknowledgement,
}

#[derive(Serialize)]
struct FulfillmentMessage<'a> {
    #[serde(rename = "MessageID")]
    message_id: usize,
    #[serde(rename = "OrderFulfillment")]
    payload: &'a OrderFulfillment,
}

#[derive(Serialize)]
struct InventoryMessage<'a> {
    #[serde(rename = "MessageID")]
    message_id: usize,
    #[serde(rename = "OperationType")]
    operation_type: &'static str,
    #[serde(rename = "Inventory")]
    payload: &'a InventoryUpdate,
}

#[derive(Serialize)]
struct PriceMessage<'a> {
    #[serde(rename = "MessageID")]
    message_id: usize,
    #[serde(rename = "Price")]
    payload: PricePayload<'a>,
}

#[derive(Serialize)]
struct PricePayload<'a> {
    #[serde(rename = "SKU")]
    sku: &'a str,
    #[serde(rename = "StandardPrice")]
    standard_price: StandardPrice<'a>,
}

#[derive(Serialize)]
struct StandardPrice<'a> {
    #[serde(rename = "@currency")]
    currency: &'a str,
    #[serde(rename = "$text")]
    amount: f64,
}

fn xml_error(error: impl fmt::Display) -> EncodingError {
    EncodingError::Xml {
        message: error.to_string(),
    }
}

/// Encodes `messages` into a feed document for `merchant_id`.
///
/// The checksum is computed over the returned bytes, which are immutable,
/// so the transmitted body always matches it.
///
/// # Errors
///
/// Returns [`EncodingError::NoFeedMessages`] if `messages` is empty, or
/// [`EncodingError::Xml`] if serialization fails.
///
/// # Example
///
/// ```rust
/// use mws_api::feeds::{content_md5, encode, FeedMessages};
///
/// let body = encode("MERCHANT", &FeedMessages::acknowledgements(["111-222"])).unwrap();
/// let xml = std::str::from_utf8(body.bytes()).unwrap();
///
/// assert!(xml.contains("<MessageID>1</MessageID>"));
/// assert_eq!(body.content_md5(), content_md5(body.bytes()));
/// ```
pub fn encode(merchant_id: &str, messages: &FeedMessages) -> Result<FeedBody, EncodingError> {
    if messages.is_empty() {
        return Err(EncodingError::NoFeedMessages);
    }
    let kind = messages.kind();

    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;
    writer.get_mut().push(b'\n');

    let mut root = BytesStart::new("AmazonEnvelope");
    root.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
    root.push_attribute(("xsi:noNamespaceSchemaLocation", SCHEMA_LOCATION));
    writer.write_event(Event::Start(root)).map_err(xml_error)?;

    writer
        .write_serializable(
            "Header",
            &Header {
                document_version: DOCUMENT_VERSION,
                merchant_identifier: merchant_id,
            },
        )
        .map_err(xml_error)?;
    writer
        .write_serializable("MessageType", &kind.message_type())
        .map_err(xml_error)?;

    match messages {
        FeedMessages::Acknowledgements(list) => {
            for (index, payload) in list.iter().enumerate() {
                let message = AcknowledgementMessage {
                    message_id: index + 1,
                    payload,
                };
                writer
                    .write_serializable("Message", &message)
                    .map_err(xml_error)?;
            }
        }
        FeedMessages::Fulfillments(list) => {
            for (index, payload) in list.iter().enumerate() {
                let message = FulfillmentMessage {
                    message_id: index + 1,
                    payload,
                };
                writer
                    .write_serializable("Message", &message)
                    .map_err(xml_error)?;
            }
        }
        FeedMessages::Inventory(list) => {
            for (index, payload) in list.iter().enumerate() {
                let message = InventoryMessage {
                    message_id: index + 1,
                    operation_type: "Update",
                    payload,
                };
                writer
                    .write_serializable("Message", &message)
                    .map_err(xml_error)?;
            }
        }
        FeedMessages::Prices(list) => {
            for (index, price) in list.iter().enumerate() {
                let message = PriceMessage {
                    message_id: index + 1,
                    payload: PricePayload {
                        sku: &price.sku,
                        standard_price: StandardPrice {
                            currency: &price.currency,
                            amount: price.amount,
                        },
                    },
                };
                writer
                    .write_serializable("Message", &message)
                    .map_err(xml_error)?;
            }
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new("AmazonEnvelope")))
        .map_err(xml_error)?;

    let bytes = Bytes::from(writer.into_inner());
    let content_md5 = content_md5(&bytes);
    Ok(FeedBody {
        kind,
        bytes,
        content_md5,
    })
}
