use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, info, warn};

use vastra_core::carrier::{
    AwbAssignment, CarrierGateway, CarrierOrderReceipt, CarrierOrderRequest, PaymentMethod,
    PickupConfirmation, PickupLocation, ServiceabilityQuery, ServiceableCourier, TrackingScan,
    TrackingSnapshot,
};
use vastra_core::error::CarrierError;

use crate::session::{Session, SessionCache};
use crate::types::*;

const LOGIN_PATH: &str = "/v1/external/auth/login";
const CREATE_ORDER_PATH: &str = "/v1/external/orders/create/adhoc";
const ASSIGN_AWB_PATH: &str = "/v1/external/courier/assign/awb";
const SERVICEABILITY_PATH: &str = "/v1/external/courier/serviceability/";
const CANCEL_SHIPMENT_PATH: &str = "/v1/external/orders/cancel/shipment/awbs";
const GENERATE_PICKUP_PATH: &str = "/v1/external/courier/generate/pickup";
const GENERATE_LABEL_PATH: &str = "/v1/external/courier/generate/label";
const PRINT_INVOICE_PATH: &str = "/v1/external/orders/print/invoice";
const PICKUP_LOCATIONS_PATH: &str = "/v1/external/settings/company/pickup";

/// Shiprocket issues tokens valid for roughly ten days
const TOKEN_TTL_DAYS: i64 = 10;

/// Default parcel dimensions (cm) when the catalog carries none
const DEFAULT_DIMENSION_CM: f64 = 10.0;

/// Configuration for the Shiprocket API client
#[derive(Clone)]
pub struct ShiprocketConfig {
    pub email: String,
    pub password: String,
    pub base_url: String,
    pub pickup_location: String,
    pub timeout_seconds: u64,
}

impl Default for ShiprocketConfig {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            base_url: "https://apiv2.shiprocket.in".to_string(),
            pickup_location: "Primary".to_string(),
            timeout_seconds: 20,
        }
    }
}

/// HTTP client for the Shiprocket logistics API.
///
/// Owns authentication (cached session token, single-flight refresh) and all
/// outbound carrier calls. Never touches local order state.
pub struct ShiprocketClient {
    http: Client,
    config: ShiprocketConfig,
    base_url: Url,
    session: SessionCache,
}

impl std::fmt::Debug for ShiprocketClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShiprocketClient")
            .field("base_url", &self.base_url.as_str())
            .field("pickup_location", &self.config.pickup_location)
            .field("timeout_seconds", &self.config.timeout_seconds)
            .finish()
    }
}

impl ShiprocketClient {
    pub fn new(config: ShiprocketConfig) -> Result<Self, CarrierError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| CarrierError::Transport(format!("Invalid base URL: {}", e)))?;

        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .user_agent(format!("vastra-engine/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CarrierError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        info!(
            base_url = %config.base_url,
            timeout_seconds = config.timeout_seconds,
            "Created Shiprocket client"
        );

        Ok(Self {
            http,
            config,
            base_url,
            session: SessionCache::new(),
        })
    }

    fn url(&self, path: &str) -> Result<Url, CarrierError> {
        self.base_url
            .join(path)
            .map_err(|e| CarrierError::Transport(format!("Failed to construct URL: {}", e)))
    }

    /// Cached-token auth; logs in only when the token is missing or within a
    /// day of expiry.
    pub async fn authenticate(&self) -> Result<String, CarrierError> {
        self.session.get_or_refresh(|| self.login()).await
    }

    /// Force the next call to re-login
    pub async fn invalidate_session(&self) {
        self.session.invalidate().await;
    }

    async fn login(&self) -> Result<Session, CarrierError> {
        let url = self.url(LOGIN_PATH)?;
        debug!(url = %url, "Logging in to Shiprocket");

        let response = self
            .http
            .post(url)
            .json(&LoginRequest {
                email: &self.config.email,
                password: &self.config.password,
            })
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = read_body(response).await;
            return Err(CarrierError::Auth(format!("HTTP {}: {}", status, text)));
        }

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| CarrierError::Auth(format!("Invalid login response: {}", e)))?;

        let token = body
            .token
            .ok_or_else(|| CarrierError::Auth("Login response carried no token".to_string()))?;

        info!("Shiprocket session established");
        Ok(Session {
            token,
            expires_at: Utc::now() + Duration::days(TOKEN_TTL_DAYS),
        })
    }

    /// Send an authenticated request. A 401 invalidates the cached token and
    /// retries exactly once with a fresh login.
    async fn send_authed(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, CarrierError> {
        let retry = builder.try_clone();
        let token = self.authenticate().await?;

        let response = builder
            .bearer_auth(&token)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            if let Some(retry) = retry {
                warn!("Shiprocket rejected session token, re-authenticating");
                self.session.invalidate().await;
                let token = self.authenticate().await?;
                return retry
                    .bearer_auth(&token)
                    .send()
                    .await
                    .map_err(transport_error);
            }
        }

        Ok(response)
    }
}

#[async_trait]
impl CarrierGateway for ShiprocketClient {
    async fn create_order(
        &self,
        request: &CarrierOrderRequest,
    ) -> Result<CarrierOrderReceipt, CarrierError> {
        let url = self.url(CREATE_ORDER_PATH)?;
        let body = build_adhoc_request(request, Utc::now().format("%Y-%m-%d %H:%M").to_string());

        debug!(reference_id = %request.reference_id, "Creating carrier order");

        let response = self.send_authed(self.http.post(url).json(&body)).await?;
        let status = response.status();
        if !status.is_success() {
            let text = read_body(response).await;
            return Err(CarrierError::Order(format!("HTTP {}: {}", status, text)));
        }

        let parsed: AdhocOrderResponse = response
            .json()
            .await
            .map_err(|e| CarrierError::Order(format!("Invalid response format: {}", e)))?;

        let receipt = receipt_from_response(parsed)?;
        info!(
            reference_id = %request.reference_id,
            carrier_order_id = receipt.order_id,
            shipment_id = ?receipt.shipment_id,
            "Carrier order created"
        );
        Ok(receipt)
    }

    async fn assign_awb(
        &self,
        shipment_id: i64,
        courier_id: Option<i64>,
    ) -> Result<AwbAssignment, CarrierError> {
        let url = self.url(ASSIGN_AWB_PATH)?;
        let body = AssignAwbRequest {
            shipment_id,
            courier_id,
        };

        let response = self.send_authed(self.http.post(url).json(&body)).await?;
        let status = response.status();
        if !status.is_success() {
            let text = read_body(response).await;
            return Err(CarrierError::Awb(format!("HTTP {}: {}", status, text)));
        }

        let parsed: AssignAwbResponse = response
            .json()
            .await
            .map_err(|e| CarrierError::Awb(format!("Invalid response format: {}", e)))?;

        let data = parsed
            .response
            .and_then(|r| r.data)
            .ok_or_else(|| CarrierError::Awb("No AWB data in response".to_string()))?;

        match (data.awb_code, data.courier_name) {
            (Some(awb), Some(courier)) if !awb.is_empty() => {
                info!(shipment_id, awb = %awb, courier = %courier, "AWB assigned");
                Ok(AwbAssignment { awb, courier })
            }
            _ => Err(CarrierError::Awb(
                "Provider did not assign a waybill".to_string(),
            )),
        }
    }

    async fn check_serviceability(
        &self,
        query: &ServiceabilityQuery,
    ) -> Result<Vec<ServiceableCourier>, CarrierError> {
        let url = self.url(SERVICEABILITY_PATH)?;

        let response = self
            .send_authed(self.http.get(url).query(&[
                ("pickup_postcode", query.pickup_pincode.as_str()),
                ("delivery_postcode", query.delivery_pincode.as_str()),
                ("weight", &query.weight_kg.to_string()),
                ("cod", if query.cod { "1" } else { "0" }),
            ]))
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = read_body(response).await;
            return Err(CarrierError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let parsed: ServiceabilityResponse = response
            .json()
            .await
            .map_err(|e| CarrierError::Transport(format!("Invalid response format: {}", e)))?;

        let couriers = parsed
            .data
            .map(|d| d.available_courier_companies)
            .unwrap_or_default()
            .into_iter()
            .map(|c| ServiceableCourier {
                courier_id: c.courier_company_id,
                name: c.courier_name,
                rate_paise: (c.rate * 100.0).round() as i64,
                estimated_days: c.etd,
            })
            .collect();

        Ok(couriers)
    }

    async fn track_by_awb(&self, awb: &str) -> Result<TrackingSnapshot, CarrierError> {
        let url = self.url(&format!("/v1/external/courier/track/awb/{}", awb))?;
        let response = self.send_authed(self.http.get(url)).await?;

        let status = response.status();
        if !status.is_success() {
            let text = read_body(response).await;
            return Err(CarrierError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let parsed: TrackResponse = response
            .json()
            .await
            .map_err(|e| CarrierError::Transport(format!("Invalid response format: {}", e)))?;

        snapshot_from_track(parsed, awb)
    }

    async fn track_by_order_id(
        &self,
        carrier_order_id: i64,
    ) -> Result<TrackingSnapshot, CarrierError> {
        let url = self.url("/v1/external/courier/track")?;
        let response = self
            .send_authed(
                self.http
                    .get(url)
                    .query(&[("order_id", carrier_order_id.to_string())]),
            )
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = read_body(response).await;
            return Err(CarrierError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let parsed: TrackResponse = response
            .json()
            .await
            .map_err(|e| CarrierError::Transport(format!("Invalid response format: {}", e)))?;

        snapshot_from_track(parsed, "")
    }

    async fn cancel_shipments(&self, awbs: &[String]) -> Result<(), CarrierError> {
        let url = self.url(CANCEL_SHIPMENT_PATH)?;
        let response = self
            .send_authed(self.http.post(url).json(&CancelShipmentRequest { awbs }))
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = read_body(response).await;
            return Err(CarrierError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        info!(count = awbs.len(), "Carrier shipments cancelled");
        Ok(())
    }

    async fn schedule_pickup(
        &self,
        shipment_ids: &[i64],
    ) -> Result<PickupConfirmation, CarrierError> {
        let url = self.url(GENERATE_PICKUP_PATH)?;
        let response = self
            .send_authed(
                self.http.post(url).json(&ShipmentIdsRequest {
                    shipment_id: shipment_ids,
                }),
            )
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = read_body(response).await;
            return Err(CarrierError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let parsed: GeneratePickupResponse = response
            .json()
            .await
            .map_err(|e| CarrierError::Transport(format!("Invalid response format: {}", e)))?;

        let body = parsed.response.unwrap_or(PickupBody {
            pickup_token_number: None,
            pickup_scheduled_date: None,
        });

        Ok(PickupConfirmation {
            pickup_token: body.pickup_token_number,
            scheduled_date: body.pickup_scheduled_date,
        })
    }

    async fn shipping_label(&self, shipment_ids: &[i64]) -> Result<String, CarrierError> {
        let url = self.url(GENERATE_LABEL_PATH)?;
        let response = self
            .send_authed(
                self.http.post(url).json(&ShipmentIdsRequest {
                    shipment_id: shipment_ids,
                }),
            )
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = read_body(response).await;
            return Err(CarrierError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let parsed: GenerateLabelResponse = response
            .json()
            .await
            .map_err(|e| CarrierError::Transport(format!("Invalid response format: {}", e)))?;

        parsed
            .label_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| CarrierError::Api {
                status: status.as_u16(),
                message: "Provider returned no label URL".to_string(),
            })
    }

    async fn invoice(&self, carrier_order_ids: &[i64]) -> Result<String, CarrierError> {
        let url = self.url(PRINT_INVOICE_PATH)?;
        let response = self
            .send_authed(
                self.http.post(url).json(&PrintInvoiceRequest {
                    ids: carrier_order_ids,
                }),
            )
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = read_body(response).await;
            return Err(CarrierError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let parsed: PrintInvoiceResponse = response
            .json()
            .await
            .map_err(|e| CarrierError::Transport(format!("Invalid response format: {}", e)))?;

        parsed
            .invoice_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| CarrierError::Api {
                status: status.as_u16(),
                message: "Provider returned no invoice URL".to_string(),
            })
    }

    async fn pickup_locations(&self) -> Vec<PickupLocation> {
        let result: Result<Vec<PickupLocation>, CarrierError> = async {
            let url = self.url(PICKUP_LOCATIONS_PATH)?;
            let response = self.send_authed(self.http.get(url)).await?;

            let status = response.status();
            if !status.is_success() {
                let text = read_body(response).await;
                return Err(CarrierError::Api {
                    status: status.as_u16(),
                    message: text,
                });
            }

            let parsed: PickupLocationsResponse = response
                .json()
                .await
                .map_err(|e| CarrierError::Transport(format!("Invalid response format: {}", e)))?;

            Ok(parsed
                .data
                .map(|d| d.shipping_address)
                .unwrap_or_default()
                .into_iter()
                .map(|row| PickupLocation {
                    id: row.id,
                    name: row.pickup_location,
                    address: row.address,
                    pincode: row.pin_code,
                })
                .collect())
        }
        .await;

        match result {
            Ok(locations) => locations,
            Err(e) => {
                warn!(error = %e, "Failed to fetch pickup locations, returning none");
                Vec::new()
            }
        }
    }
}

fn transport_error(err: reqwest::Error) -> CarrierError {
    if err.is_timeout() {
        CarrierError::Timeout
    } else {
        CarrierError::Transport(err.to_string())
    }
}

async fn read_body(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string())
}

fn build_adhoc_request(request: &CarrierOrderRequest, order_date: String) -> AdhocOrderRequest {
    let (first_name, last_name) = match request.customer_name.rsplit_once(' ') {
        Some((first, last)) => (first.to_string(), last.to_string()),
        None => (request.customer_name.clone(), String::new()),
    };

    AdhocOrderRequest {
        order_id: request.reference_id.clone(),
        order_date,
        pickup_location: request.pickup_location.clone(),
        billing_customer_name: first_name,
        billing_last_name: last_name,
        billing_address: request.address.street.clone(),
        billing_city: request.address.city.clone(),
        billing_pincode: request.address.pincode.clone(),
        billing_state: request.address.state.clone(),
        billing_country: "India".to_string(),
        billing_email: request.email.clone(),
        billing_phone: request.phone.clone(),
        shipping_is_billing: true,
        order_items: request
            .items
            .iter()
            .map(|item| AdhocOrderItem {
                name: item.name.clone(),
                sku: item.sku.clone(),
                units: item.units,
                selling_price: item.selling_price_paise as f64 / 100.0,
            })
            .collect(),
        payment_method: match request.payment_method {
            PaymentMethod::Prepaid => "Prepaid".to_string(),
            PaymentMethod::Cod => "COD".to_string(),
        },
        sub_total: request.subtotal_paise as f64 / 100.0,
        length: DEFAULT_DIMENSION_CM,
        breadth: DEFAULT_DIMENSION_CM,
        height: DEFAULT_DIMENSION_CM,
        weight: request.weight_kg,
    }
}

fn receipt_from_response(response: AdhocOrderResponse) -> Result<CarrierOrderReceipt, CarrierError> {
    let order_id = response
        .order_id
        .filter(|id| *id > 0)
        .ok_or_else(|| CarrierError::Order("Provider returned no order id".to_string()))?;

    Ok(CarrierOrderReceipt {
        order_id,
        shipment_id: response.shipment_id.filter(|id| *id > 0),
        awb: response.awb_code.filter(|awb| !awb.is_empty()),
        courier: response.courier_name.filter(|c| !c.is_empty()),
    })
}

fn snapshot_from_track(response: TrackResponse, awb_hint: &str) -> Result<TrackingSnapshot, CarrierError> {
    let data = response.tracking_data.ok_or_else(|| CarrierError::Api {
        status: 200,
        message: "No tracking data in response".to_string(),
    })?;

    let leg = data.shipment_track.into_iter().next();
    let (awb, current_status, courier) = match leg {
        Some(leg) => (
            leg.awb_code.unwrap_or_else(|| awb_hint.to_string()),
            leg.current_status.unwrap_or_else(|| "Unknown".to_string()),
            leg.courier_name,
        ),
        None => (awb_hint.to_string(), "Unknown".to_string(), None),
    };

    Ok(TrackingSnapshot {
        awb,
        current_status,
        etd: data.etd,
        courier,
        scans: data
            .shipment_track_activities
            .into_iter()
            .map(|scan| TrackingScan {
                status: scan.status.or(scan.activity).unwrap_or_default(),
                location: scan.location,
                timestamp: scan.date,
            })
            .collect(),
    })
}
