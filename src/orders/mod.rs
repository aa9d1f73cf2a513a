//! Orders API (`Orders/2013-09-01`).
//!
//! `ListOrders` and `ListOrderItems` are paginated; their `all` methods
//! follow continuation tokens through [`collect_all`].
//!
//! # Example
//!
//! ```rust,ignore
//! use chrono::{Duration, Utc};
//! use mws_api::orders::OrdersApi;
//!
//! let orders = OrdersApi::new(&client, &config);
//! let recent = orders
//!     .list_orders()
//!     .created_after(Utc::now() - Duration::days(2))
//!     .order_statuses(["Unshipped", "PartiallyShipped"])
//!     .all(&cancel)
//!     .await?;
//!
//! for order in &recent {
//!     let items = orders.list_order_items(&order.amazon_order_id).all(&cancel).await?;
//!     println!("{}: {} items", order.amazon_order_id, items.len());
//! }
//! ```

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::auth::format_timestamp;
use crate::clients::{
    collect_all, decode_response, HttpMethod, ListOperation, MwsError, MwsRequest, Page,
    PaginationError, ResponseMetadata, Transport,
};
use crate::config::{ApiSection, Endpoint, MwsConfig};

/// An amount of money.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct Money {
    /// ISO currency code.
    pub currency_code: String,
    /// Decimal amount, as sent by the service.
    pub amount: String,
}

/// A shipping address.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct Address {
    /// Recipient name.
    pub name: String,
    /// First address line.
    pub address_line1: String,
    /// Second address line.
    pub address_line2: String,
    /// Third address line.
    pub address_line3: String,
    /// City.
    pub city: String,
    /// State or region.
    pub state_or_region: String,
    /// Postal code.
    pub postal_code: String,
    /// Two-letter country code.
    pub country_code: String,
    /// Phone number.
    pub phone: String,
    /// `Commercial` or `Residential`.
    pub address_type: String,
}

/// Payment method details of an order.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PaymentMethodDetails {
    /// Payment methods used (e.g., `Standard`, `GiftCertificate`).
    #[serde(rename = "PaymentMethodDetail")]
    pub details: Vec<String>,
}

/// An order.
///
/// Fields the service omits are left empty.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct Order {
    /// Amazon-defined order identifier.
    pub amazon_order_id: String,
    /// When the order was placed.
    pub purchase_date: String,
    /// When the order was last updated.
    pub last_update_date: String,
    /// Current status (e.g., `Unshipped`, `Shipped`).
    pub order_status: String,
    /// `AFN` (fulfilled by Amazon) or `MFN` (fulfilled by the seller).
    pub fulfillment_channel: String,
    /// Sales channel of the first item.
    pub sales_channel: String,
    /// Shipment service level.
    pub ship_service_level: String,
    /// Shipment service level category (e.g., `Expedited`).
    pub shipment_service_level_category: String,
    /// `StandardOrder` or `Preorder`.
    pub order_type: String,
    /// Marketplace where the order was placed.
    pub marketplace_id: String,
    /// Anonymized buyer e-mail address.
    pub buyer_email: String,
    /// Buyer name.
    pub buyer_name: String,
    /// Shipping address, if available.
    pub shipping_address: Option<Address>,
    /// Order total, if available.
    pub order_total: Option<Money>,
    /// Number of items shipped.
    pub number_of_items_shipped: u32,
    /// Number of items not yet shipped.
    pub number_of_items_unshipped: u32,
    /// Main payment method (e.g., `COD`, `Other`).
    pub payment_method: String,
    /// All payment methods used.
    pub payment_method_details: PaymentMethodDetails,
    /// Start of the promised shipping window.
    pub earliest_ship_date: String,
    /// End of the promised shipping window.
    pub latest_ship_date: String,
    /// Whether the buyer is a business.
    pub is_business_order: bool,
    /// Whether the order is a Prime order.
    pub is_prime: bool,
    /// Whether the order uses premium shipping.
    pub is_premium_order: bool,
}

/// A line item of an order.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct OrderItem {
    /// Amazon-defined order item identifier.
    pub order_item_id: String,
    /// Amazon Standard Identification Number of the item.
    #[serde(rename = "ASIN")]
    pub asin: String,
    /// Seller SKU of the item.
    #[serde(rename = "SellerSKU")]
    pub seller_sku: String,
    /// Item title.
    pub title: String,
    /// Number of items ordered.
    pub quantity_ordered: u32,
    /// Number of items shipped.
    pub quantity_shipped: u32,
    /// Selling price of the ordered quantity.
    pub item_price: Option<Money>,
}

#[derive(Debug, Default, Deserialize)]
struct OrderList {
    #[serde(rename = "Order", default)]
    orders: Vec<Order>,
}

#[derive(Debug, Default, Deserialize)]
struct OrderItemList {
    #[serde(rename = "OrderItem", default)]
    items: Vec<OrderItem>,
}

/// The result element shared by `ListOrders` and `ListOrdersByNextToken`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ListOrdersResult {
    next_token: Option<String>,
    orders: OrderList,
}

#[derive(Debug, Deserialize)]
struct ListOrdersResponse {
    #[serde(rename = "ListOrdersResult")]
    result: ListOrdersResult,
}

#[derive(Debug, Deserialize)]
struct ListOrdersByNextTokenResponse {
    #[serde(rename = "ListOrdersByNextTokenResult")]
    result: ListOrdersResult,
}

/// The result element shared by `ListOrderItems` and `ListOrderItemsByNextToken`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ListOrderItemsResult {
    next_token: Option<String>,
    order_items: OrderItemList,
}

#[derive(Debug, Deserialize)]
struct ListOrderItemsResponse {
    #[serde(rename = "ListOrderItemsResult")]
    result: ListOrderItemsResult,
}

#[derive(Debug, Deserialize)]
struct ListOrderItemsByNextTokenResponse {
    #[serde(rename = "ListOrderItemsByNextTokenResult")]
    result: ListOrderItemsResult,
}

/// The `GetOrderResult` element.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct GetOrderResult {
    /// The requested orders.
    #[serde(rename = "Orders", default, deserialize_with = "deserialize_orders")]
    pub orders: Vec<Order>,
}

fn deserialize_orders<'de, D>(deserializer: D) -> Result<Vec<Order>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    OrderList::deserialize(deserializer).map(|list| list.orders)
}

/// Response of `GetOrder`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct GetOrderResponse {
    /// The result.
    #[serde(rename = "GetOrderResult")]
    pub result: GetOrderResult,
    /// Request metadata.
    #[serde(rename = "ResponseMetadata", default)]
    pub metadata: ResponseMetadata,
}

/// Client for the Orders API.
#[derive(Debug)]
pub struct OrdersApi<'a, T> {
    transport: &'a T,
    endpoint: Endpoint,
}

impl<'a, T: Transport> OrdersApi<'a, T> {
    /// Creates an Orders API client for the configured region.
    #[must_use]
    pub fn new(transport: &'a T, config: &MwsConfig) -> Self {
        Self {
            transport,
            endpoint: config.endpoint(ApiSection::Orders),
        }
    }

    /// Starts a `ListOrders` request.
    #[must_use]
    pub fn list_orders(&self) -> ListOrders<'a, T> {
        ListOrders {
            transport: self.transport,
            request: MwsRequest::builder(HttpMethod::Get, &self.endpoint, "ListOrders").build(),
        }
    }

    /// Starts a `ListOrderItems` request for one order.
    #[must_use]
    pub fn list_order_items(&self, order_id: &str) -> ListOrderItems<'a, T> {
        ListOrderItems {
            transport: self.transport,
            request: MwsRequest::builder(HttpMethod::Get, &self.endpoint, "ListOrderItems")
                .param("AmazonOrderId", order_id)
                .build(),
        }
    }

    /// Fetches orders by id (`AmazonOrderId.Id.N`).
    ///
    /// # Errors
    ///
    /// Returns [`MwsError`] if the call fails or the response cannot be
    /// decoded.
    pub async fn get_order<I, S>(
        &self,
        order_ids: I,
        cancel: &CancellationToken,
    ) -> Result<GetOrderResponse, MwsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let request = MwsRequest::builder(HttpMethod::Get, &self.endpoint, "GetOrder")
            .indexed_params("AmazonOrderId.Id", order_ids)
            .build();
        let body = self.transport.call(request, cancel).await?;
        decode_response(&body)
    }
}

/// A `ListOrders` request.
#[derive(Debug)]
pub struct ListOrders<'a, T> {
    transport: &'a T,
    request: MwsRequest,
}

impl<'a, T: Transport> ListOrders<'a, T> {
    /// Only orders created at or after `time`.
    #[must_use]
    pub fn created_after(mut self, time: DateTime<Utc>) -> Self {
        self.request.params.set("CreatedAfter", format_timestamp(&time));
        self
    }

    /// Only orders created before `time`.
    #[must_use]
    pub fn created_before(mut self, time: DateTime<Utc>) -> Self {
        self.request.params.set("CreatedBefore", format_timestamp(&time));
        self
    }

    /// Only orders in one of `statuses` (`OrderStatus.Status.N`).
    #[must_use]
    pub fn order_statuses<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request.params.add_indexed("OrderStatus.Status", statuses);
        self
    }

    /// Fetches every page of orders.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError`] with the orders fetched so far if any
    /// page fails.
    pub async fn all(&self, cancel: &CancellationToken) -> Result<Vec<Order>, PaginationError<Order>> {
        collect_all(self.transport, self, cancel).await
    }
}

impl<T> ListOperation for ListOrders<'_, T> {
    type Item = Order;

    fn request(&self) -> &MwsRequest {
        &self.request
    }

    fn decode_first(&self, body: &Bytes) -> Result<Page<Order>, MwsError> {
        let response: ListOrdersResponse = decode_response(body)?;
        Ok(Page::new(response.result.orders.orders, response.result.next_token))
    }

    fn decode_next(&self, body: &Bytes) -> Result<Page<Order>, MwsError> {
        let response: ListOrdersByNextTokenResponse = decode_response(body)?;
        Ok(Page::new(response.result.orders.orders, response.result.next_token))
    }
}

/// A `ListOrderItems` request.
#[derive(Debug)]
pub struct ListOrderItems<'a, T> {
    transport: &'a T,
    request: MwsRequest,
}

impl<'a, T: Transport> ListOrderItems<'a, T> {
    /// Fetches every page of order items.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError`] with the items fetched so far if any page
    /// fails.
    pub async fn all(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<OrderItem>, PaginationError<OrderItem>> {
        collect_all(self.transport, self, cancel).await
    }
}

impl<T> ListOperation for ListOrderItems<'_, T> {
    type Item = OrderItem;

    fn request(&self) -> &MwsRequest {
        &self.request
    }

    fn decode_first(&self, body: &Bytes) -> Result<Page<OrderItem>, MwsError> {
        let response: ListOrderItemsResponse = decode_response(body)?;
        Ok(Page::new(
            response.result.order_items.items,
            response.result.next_token,
        ))
    }

    fn decode_next(&self, body: &Bytes) -> Result<Page<OrderItem>, MwsError> {
        let response: ListOrderItemsByNextTokenResponse = decode_response(body)?;
        Ok(Page::new(
            response.result.order_items.items,
            response.result.next_token,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Credentials, Region};
    use chrono::TimeZone;

    struct NoTransport;

    impl Transport for NoTransport {
        async fn call(
            &self,
            _request: MwsRequest,
            _cancel: &CancellationToken,
        ) -> Result<Bytes, MwsError> {
            Err(MwsError::Cancelled)
        }
    }

    fn config() -> MwsConfig {
        MwsConfig::builder()
            .credentials(Credentials::new("a", "s", "m"))
            .region(Region::new("NA", "US", "https://mws.amazonservices.com/", "ATVPDKIKX0DER"))
            .build()
            .unwrap()
    }

    const LIST_ORDERS_XML: &str = r#"<?xml version="1.0"?>
<ListOrdersResponse xmlns="https://mws.amazonservices.com/Orders/2013-09-01">
  <ListOrdersResult>
    <NextToken>2YgYW55IGNhcm5hbCBwbGVhc3VyZS4=</NextToken>
    <LastUpdatedBefore>2017-02-25T18:10:21.687Z</LastUpdatedBefore>
    <Orders>
      <Order>
        <AmazonOrderId>902-3159896-1390916</AmazonOrderId>
        <PurchaseDate>2017-02-20T19:49:35Z</PurchaseDate>
        <OrderStatus>Unshipped</OrderStatus>
        <BuyerEmail>5vlhEXAMPLEh9h5@marketplace.amazon.com</BuyerEmail>
        <ShippingAddress>
          <Name>Buyer name</Name>
          <AddressLine1>1234 Any St.</AddressLine1>
          <City>Seattle</City>
          <PostalCode>98103</PostalCode>
          <CountryCode>US</CountryCode>
          <AddressType>Commercial</AddressType>
        </ShippingAddress>
        <OrderTotal>
          <CurrencyCode>USD</CurrencyCode>
          <Amount>25.00</Amount>
        </OrderTotal>
        <NumberOfItemsShipped>0</NumberOfItemsShipped>
        <NumberOfItemsUnshipped>1</NumberOfItemsUnshipped>
        <PaymentMethodDetails>
          <PaymentMethodDetail>CreditCard</PaymentMethodDetail>
          <PaymentMethodDetail>GiftCertificate</PaymentMethodDetail>
        </PaymentMethodDetails>
        <IsPrime>true</IsPrime>
      </Order>
      <Order>
        <AmazonOrderId>483-3488972-0896720</AmazonOrderId>
        <OrderStatus>Shipped</OrderStatus>
      </Order>
    </Orders>
  </ListOrdersResult>
  <ResponseMetadata>
    <RequestId>88faca76-b600-46d2-b53c-0c8c4533e43a</RequestId>
  </ResponseMetadata>
</ListOrdersResponse>"#;

    #[test]
    fn test_list_orders_request_parameters() {
        let config = config();
        let api = OrdersApi::new(&NoTransport, &config);
        let op = api
            .list_orders()
            .created_after(Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap())
            .order_statuses(["Unshipped", "PartiallyShipped"]);

        let request = op.request();
        assert_eq!(request.action(), Some("ListOrders"));
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.params.first("Version"), Some("2013-09-01"));
        assert_eq!(
            request.params.first("CreatedAfter"),
            Some("2020-01-02T03:04:05Z")
        );
        assert!(!request.params.contains("CreatedBefore"));
        assert_eq!(
            request.params.first("OrderStatus.Status.1"),
            Some("Unshipped")
        );
        assert_eq!(
            request.params.first("OrderStatus.Status.2"),
            Some("PartiallyShipped")
        );
    }

    #[test]
    fn test_decode_list_orders_page() {
        let config = config();
        let api = OrdersApi::new(&NoTransport, &config);
        let page = api
            .list_orders()
            .decode_first(&Bytes::from_static(LIST_ORDERS_XML.as_bytes()))
            .unwrap();

        assert_eq!(page.token(), Some("2YgYW55IGNhcm5hbCBwbGVhc3VyZS4="));
        assert_eq!(page.items.len(), 2);

        let order = &page.items[0];
        assert_eq!(order.amazon_order_id, "902-3159896-1390916");
        assert_eq!(order.order_status, "Unshipped");
        assert_eq!(order.number_of_items_unshipped, 1);
        assert!(order.is_prime);
        assert_eq!(
            order.shipping_address.as_ref().map(|a| a.city.as_str()),
            Some("Seattle")
        );
        assert_eq!(
            order.order_total.as_ref().map(|m| m.amount.as_str()),
            Some("25.00")
        );
        assert_eq!(
            order.payment_method_details.details,
            vec!["CreditCard", "GiftCertificate"]
        );

        assert_eq!(page.items[1].amazon_order_id, "483-3488972-0896720");
        assert!(page.items[1].shipping_address.is_none());
    }

    #[test]
    fn test_decode_list_orders_by_next_token_page() {
        let xml = r#"<ListOrdersByNextTokenResponse>
  <ListOrdersByNextTokenResult>
    <Orders><Order><AmazonOrderId>1</AmazonOrderId></Order></Orders>
  </ListOrdersByNextTokenResult>
</ListOrdersByNextTokenResponse>"#;
        let config = config();
        let api = OrdersApi::new(&NoTransport, &config);
        let page = api
            .list_orders()
            .decode_next(&Bytes::from_static(xml.as_bytes()))
            .unwrap();

        assert_eq!(page.token(), None);
        assert_eq!(page.items[0].amazon_order_id, "1");
    }

    #[test]
    fn test_decode_empty_order_list() {
        let xml = "<ListOrdersResponse><ListOrdersResult><Orders/></ListOrdersResult></ListOrdersResponse>";
        let config = config();
        let api = OrdersApi::new(&NoTransport, &config);
        let page = api
            .list_orders()
            .decode_first(&Bytes::from_static(xml.as_bytes()))
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.token(), None);
    }

    #[test]
    fn test_list_order_items_request_and_decode() {
        let config = config();
        let api = OrdersApi::new(&NoTransport, &config);
        let op = api.list_order_items("058-1233752-8214740");
        assert_eq!(op.request().action(), Some("ListOrderItems"));
        assert_eq!(
            op.request().params.first("AmazonOrderId"),
            Some("058-1233752-8214740")
        );

        let xml = r#"<ListOrderItemsResponse>
  <ListOrderItemsResult>
    <NextToken>MRgZW55IGNhcm5hbCBwbGVhc3VyZS6=</NextToken>
    <AmazonOrderId>058-1233752-8214740</AmazonOrderId>
    <OrderItems>
      <OrderItem>
        <ASIN>BT0093TELA</ASIN>
        <OrderItemId>68828574383266</OrderItemId>
        <SellerSKU>CBA_OTF_1</SellerSKU>
        <Title>Example item name</Title>
        <QuantityOrdered>1</QuantityOrdered>
        <QuantityShipped>1</QuantityShipped>
        <ItemPrice><CurrencyCode>JPY</CurrencyCode><Amount>25.99</Amount></ItemPrice>
      </OrderItem>
    </OrderItems>
  </ListOrderItemsResult>
</ListOrderItemsResponse>"#;
        let page = op.decode_first(&Bytes::from_static(xml.as_bytes())).unwrap();
        assert_eq!(page.token(), Some("MRgZW55IGNhcm5hbCBwbGVhc3VyZS6="));
        let item = &page.items[0];
        assert_eq!(item.asin, "BT0093TELA");
        assert_eq!(item.seller_sku, "CBA_OTF_1");
        assert_eq!(item.quantity_ordered, 1);
        assert_eq!(
            item.item_price.as_ref().map(|m| m.currency_code.as_str()),
            Some("JPY")
        );
    }

    #[test]
    fn test_decode_get_order_response() {
        let xml = r#"<GetOrderResponse>
  <GetOrderResult>
    <Orders>
      <Order><AmazonOrderId>1</AmazonOrderId></Order>
      <Order><AmazonOrderId>2</AmazonOrderId></Order>
    </Orders>
  </GetOrderResult>
  <ResponseMetadata><RequestId>r-9</RequestId></ResponseMetadata>
</GetOrderResponse>"#;
        let response: GetOrderResponse =
            decode_response(&Bytes::from_static(xml.as_bytes())).unwrap();
        let ids: Vec<&str> = response
            .result
            .orders
            .iter()
            .map(|o| o.amazon_order_id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(response.metadata.request_id, "r-9");
    }

    #[test]
    fn test_decode_error_envelope_as_api_error() {
        let xml = "<ErrorResponse><Error><Type>Sender</Type><Code>InvalidParameterValue</Code><Message>bad</Message></Error><RequestId>r</RequestId></ErrorResponse>";
        let config = config();
        let api = OrdersApi::new(&NoTransport, &config);
        let result = api
            .list_orders()
            .decode_first(&Bytes::from_static(xml.as_bytes()));
        assert!(matches!(result, Err(MwsError::Api(_))));
    }
}
