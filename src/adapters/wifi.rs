//! WiFi station-mode adapter.
//!
//! The HTTP server needs the feeder on the local network.  This module
//! validates the compiled-in credentials and, on ESP-IDF, brings the
//! station up and keeps it connected.
//!
//! ## cfg gating
//!
//! - **`espidf`**: real ESP-IDF WiFi driver via `esp_idf_svc::wifi`.
//! - **all targets**: credential validation and the reconnect backoff,
//!   so both are covered by host tests.
//!
//! ## Reconnection policy
//!
//! On disconnect the station waits an exponential backoff (2 s → 4 s →
//! 8 s … capped at 60 s) before retrying.

use core::fmt;
use core::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
        }
    }
}

impl std::error::Error for ConnectivityError {}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

/// Validated station credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
}

impl WifiCredentials {
    pub fn new(ssid: &str, password: &str) -> Result<Self, ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        let mut creds = Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
        };
        creds
            .ssid
            .push_str(ssid)
            .map_err(|()| ConnectivityError::InvalidSsid)?;
        creds
            .password
            .push_str(password)
            .map_err(|()| ConnectivityError::InvalidPassword)?;
        Ok(creds)
    }

    /// Credentials baked in at build time through `PETFEEDER_WIFI_SSID` and
    /// `PETFEEDER_WIFI_PASS`.
    pub fn from_build_env() -> Result<Self, ConnectivityError> {
        let ssid = option_env!("PETFEEDER_WIFI_SSID").ok_or(ConnectivityError::NoCredentials)?;
        Self::new(ssid, option_env!("PETFEEDER_WIFI_PASS").unwrap_or(""))
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

// ───────────────────────────────────────────────────────────────
// Reconnect backoff
// ───────────────────────────────────────────────────────────────

const MIN_BACKOFF_SECS: u64 = 2;
const MAX_BACKOFF_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    secs: u64,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            secs: MIN_BACKOFF_SECS,
        }
    }
}

impl Backoff {
    /// Delay before the next attempt; doubles the following one.
    pub fn next_delay(&mut self) -> Duration {
        let delay = Duration::from_secs(self.secs);
        self.secs = (self.secs * 2).min(MAX_BACKOFF_SECS);
        delay
    }

    pub fn reset(&mut self) {
        self.secs = MIN_BACKOFF_SECS;
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF station
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use station::WifiStation;

#[cfg(target_os = "espidf")]
mod station {
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::hal::modem::Modem;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::wifi::{
        AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi,
    };
    use log::{info, warn};

    use super::{Backoff, ConnectivityError, WifiCredentials};

    pub struct WifiStation {
        wifi: BlockingWifi<EspWifi<'static>>,
        backoff: Backoff,
    }

    impl WifiStation {
        pub fn start(
            modem: Modem,
            sysloop: EspSystemEventLoop,
            nvs: EspDefaultNvsPartition,
            creds: &WifiCredentials,
        ) -> anyhow::Result<Self> {
            let esp_wifi = EspWifi::new(modem, sysloop.clone(), Some(nvs))?;
            let mut wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;

            let auth_method = if creds.is_open() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            };
            wifi.set_configuration(&Configuration::Client(ClientConfiguration {
                ssid: creds
                    .ssid()
                    .try_into()
                    .map_err(|()| ConnectivityError::InvalidSsid)?,
                password: creds
                    .password()
                    .try_into()
                    .map_err(|()| ConnectivityError::InvalidPassword)?,
                auth_method,
                ..Default::default()
            }))?;
            wifi.start()?;
            info!("WiFi: connecting to '{}'", creds.ssid());

            let mut station = Self {
                wifi,
                backoff: Backoff::default(),
            };
            station.connect()?;
            Ok(station)
        }

        fn connect(&mut self) -> anyhow::Result<()> {
            self.wifi.connect()?;
            self.wifi.wait_netif_up()?;
            let ip = self.wifi.wifi().sta_netif().get_ip_info()?;
            info!("WiFi: connected, ip={}", ip.ip);
            self.backoff.reset();
            Ok(())
        }

        pub fn is_connected(&self) -> bool {
            self.wifi.is_connected().unwrap_or(false)
        }

        /// Reconnect if the link dropped, sleeping out the backoff after a
        /// failed attempt.
        pub fn keep_alive(&mut self) {
            if self.is_connected() {
                return;
            }
            warn!("WiFi: connection lost, reconnecting");
            if let Err(e) = self.connect() {
                let delay = self.backoff.next_delay();
                warn!("WiFi: reconnect failed ({}), retry in {:?}", e, delay);
                std::thread::sleep(delay);
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
