use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use portal_core::config::default_config;
use portal_core::{ApiClient, PortalError, ReqwestTransport, SessionStorage};
use url::Url;

/// `window.localStorage`, shared with any other tab on the same origin.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn storage(&self) -> Result<web_sys::Storage, PortalError> {
        web_sys::window()
            .ok_or_else(|| PortalError::Storage("No window available".to_string()))?
            .local_storage()
            .map_err(|_| PortalError::Storage("localStorage is not accessible".to_string()))?
            .ok_or_else(|| PortalError::Storage("localStorage is disabled".to_string()))
    }
}

impl SessionStorage for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, PortalError> {
        self.storage()?
            .get_item(key)
            .map_err(|_| PortalError::Storage(format!("Failed to read '{}'", key)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), PortalError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|_| PortalError::Storage(format!("Failed to write '{}'", key)))
    }

    fn remove_item(&self, key: &str) -> Result<(), PortalError> {
        self.storage()?
            .remove_item(key)
            .map_err(|_| PortalError::Storage(format!("Failed to remove '{}'", key)))
    }
}

pub type PortalClient = ApiClient<ReqwestTransport, BrowserStorage>;

thread_local! {
    static CLIENT: RefCell<Option<Rc<PortalClient>>> = const { RefCell::new(None) };
}

/// The API is served from the same origin as the app.
fn page_origin() -> Option<Url> {
    let origin = web_sys::window()?.location().origin().ok()?;
    Url::parse(&origin).ok()
}

fn build_client() -> Result<PortalClient, PortalError> {
    let mut config = default_config();
    if let Some(origin) = page_origin() {
        config = config.with_base_url(origin);
    }
    let transport = ReqwestTransport::new(config.request_timeout())?;
    Ok(ApiClient::from_config(transport, BrowserStorage, &config))
}

/// The shared client, built on first use.
pub fn client() -> Result<Rc<PortalClient>, PortalError> {
    CLIENT.with(|slot| {
        if let Some(client) = slot.borrow().as_ref() {
            return Ok(client.clone());
        }
        let client = Rc::new(build_client()?);
        *slot.borrow_mut() = Some(client.clone());
        Ok(client)
    })
}

/// Today's date in the browser's local time zone.
pub fn today() -> NaiveDate {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(
        now.get_full_year() as i32,
        now.get_month() + 1,
        now.get_date(),
    )
    .unwrap_or_default()
}
