//! Typed response records.
//!
//! Each struct mirrors one JSON shape returned by the service. Decoding goes
//! through [`crate::client::decode`] so a missing required field surfaces as
//! `ApiError::MalformedResponse` instead of a panic further down.
//!
//! Identifiers arrive as strings or numbers depending on the endpoint, so
//! they are normalised to `String` on the way in.

use lockvault_core::LockRecord;
use lockvault_core::ids::{id_string, opt_id_string};
use serde::Deserialize;

/// `POST v4/account/authenticate/`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(rename = "Token")]
    pub token: String,
}

/// One entry of `GET v4/kmsdevicekey/`
#[derive(Debug, Clone, Deserialize)]
pub struct KmsDeviceKey {
    #[serde(rename = "DeviceId", deserialize_with = "id_string")]
    pub device_id: String,

    #[serde(rename = "KMSDeviceId", deserialize_with = "id_string")]
    pub kms_device_id: String,
}

impl From<KmsDeviceKey> for LockRecord {
    fn from(key: KmsDeviceKey) -> Self {
        LockRecord::new(key.device_id, key.kms_device_id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Location {
    #[serde(rename = "Latitude", default)]
    pub latitude: Option<f64>,

    #[serde(rename = "Longitude", default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KmsDevice {
    #[serde(rename = "DeviceId", deserialize_with = "id_string")]
    pub device_id: String,

    #[serde(rename = "Id", deserialize_with = "id_string")]
    pub id: String,

    #[serde(rename = "PrimaryCode", default, deserialize_with = "opt_id_string")]
    pub primary_code: Option<String>,

    #[serde(rename = "Location", default)]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Model {
    #[serde(rename = "Id", default, deserialize_with = "opt_id_string")]
    pub id: Option<String>,

    #[serde(rename = "Name", default)]
    pub name: Option<String>,

    #[serde(rename = "ModelNumber", default, deserialize_with = "opt_id_string")]
    pub model_number: Option<String>,

    #[serde(rename = "SKU", default, deserialize_with = "opt_id_string")]
    pub sku: Option<String>,
}

/// One entry of `GET v4/product?complex=true`, or the body of `GET v4/product/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    #[serde(rename = "Name", default)]
    pub name: Option<String>,

    #[serde(rename = "Id", deserialize_with = "id_string")]
    pub id: String,

    #[serde(rename = "KMSDevice")]
    pub kms_device: KmsDevice,

    #[serde(rename = "Model", default)]
    pub model: Option<Model>,
}

impl From<Product> for LockRecord {
    fn from(product: Product) -> Self {
        let location = product.kms_device.location.unwrap_or_default();
        let model = product.model.unwrap_or_default();

        let mut lock = LockRecord::new(product.kms_device.device_id, product.kms_device.id);
        lock.name = product.name;
        lock.product_id = Some(product.id);
        lock.latitude = location.latitude;
        lock.longitude = location.longitude;
        lock.primary_code = product.kms_device.primary_code;
        lock.model_id = model.id;
        lock.model_name = model.name;
        lock.model_number = model.model_number;
        lock.model_sku = model.sku;
        lock
    }
}

/// `GET v4/kmsdevice/{id}/servicecode/`
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceCodeResponse {
    #[serde(rename = "ServiceCode", deserialize_with = "id_string")]
    pub service_code: String,
}

/// `GET v4/kmsdevice/{id}/mastercode`
#[derive(Debug, Clone, Deserialize)]
pub struct MasterCodeResponse {
    #[serde(rename = "MasterCode", deserialize_with = "id_string")]
    pub master_code: String,
}
