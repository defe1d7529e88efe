//! WiFi station-mode adapter.
//!
//! Implements [`LinkPort`] with one association attempt per call; the
//! [`ConnectivitySupervisor`](crate::app::supervisor::ConnectivitySupervisor)
//! owns the retry policy.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//!   SNTP is started after the first successful association so the wall
//!   clock becomes valid.
//! - **all other targets**: simulation stubs for host-side runs.

use log::{info, warn};

use crate::app::ports::LinkPort;
use crate::config::NetworkConfig;
use crate::error::LinkError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    sntp::EspSntp,
    wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    #[cfg(target_os = "espidf")]
    wifi: BlockingWifi<EspWifi<'static>>,
    #[cfg(target_os = "espidf")]
    sntp: Option<EspSntp<'static>>,
    /// Simulation: association state and attempt counter.
    #[cfg(not(target_os = "espidf"))]
    sim_associated: bool,
    #[cfg(not(target_os = "espidf"))]
    sim_attempts: u32,
}

impl WifiAdapter {
    fn credentials(
        network: &NetworkConfig,
    ) -> Result<(heapless::String<32>, heapless::String<64>), LinkError> {
        let mut ssid = heapless::String::new();
        ssid.push_str(&network.ssid)
            .map_err(|_| LinkError::InvalidCredentials)?;
        let mut password = heapless::String::new();
        password
            .push_str(&network.password)
            .map_err(|_| LinkError::InvalidCredentials)?;
        Ok((ssid, password))
    }

    #[cfg(target_os = "espidf")]
    pub fn new(
        wifi: BlockingWifi<EspWifi<'static>>,
        network: &NetworkConfig,
    ) -> Result<Self, LinkError> {
        let (ssid, password) = Self::credentials(network)?;
        Ok(Self {
            ssid,
            password,
            wifi,
            sntp: None,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(network: &NetworkConfig) -> Result<Self, LinkError> {
        let (ssid, password) = Self::credentials(network)?;
        Ok(Self {
            ssid,
            password,
            sim_associated: false,
            sim_attempts: 0,
        })
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_associate(&mut self) -> Result<(), LinkError> {
        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = Configuration::Client(ClientConfiguration {
            ssid: self.ssid.clone(),
            password: self.password.clone(),
            auth_method,
            ..Default::default()
        });
        self.wifi
            .set_configuration(&config)
            .map_err(|_| LinkError::InvalidCredentials)?;

        if !self.wifi.is_started().unwrap_or(false) {
            self.wifi
                .start()
                .map_err(|_| LinkError::AssociationFailed)?;
        }

        let joined = self
            .wifi
            .connect()
            .and_then(|()| self.wifi.wait_netif_up());
        if let Err(e) = joined {
            warn!("WiFi(espidf): connect failed ({:?})", e);
            // Leave the driver idle for the next attempt.
            if let Err(e) = self.wifi.disconnect() {
                warn!("WiFi(espidf): disconnect after failed join failed ({:?})", e);
            }
            return Err(LinkError::AssociationFailed);
        }

        if self.sntp.is_none() {
            match EspSntp::new_default() {
                Ok(sntp) => {
                    info!("WiFi(espidf): SNTP started");
                    self.sntp = Some(sntp);
                }
                Err(e) => warn!("WiFi(espidf): SNTP start failed ({:?})", e),
            }
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_associate(&mut self) -> Result<(), LinkError> {
        self.sim_attempts = self.sim_attempts.wrapping_add(1);
        // Every 7th attempt fails to exercise the supervisor's retry path.
        if self.sim_attempts % 7 == 3 {
            warn!("WiFi(sim): simulated association failure (attempt {})", self.sim_attempts);
            return Err(LinkError::AssociationFailed);
        }
        self.sim_associated = true;
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_associated(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false) && self.wifi.is_up().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_associated(&self) -> bool {
        self.sim_associated
    }

    /// Simulation: drop the association as if the AP went away.
    #[cfg(all(test, not(target_os = "espidf")))]
    fn sim_drop(&mut self) {
        info!("WiFi(sim): association dropped");
        self.sim_associated = false;
    }
}

// ───────────────────────────────────────────────────────────────
// LinkPort
// ───────────────────────────────────────────────────────────────

impl LinkPort for WifiAdapter {
    fn is_associated(&self) -> bool {
        self.platform_is_associated()
    }

    fn associate(&mut self) -> Result<(), LinkError> {
        info!("WiFi: connecting to '{}'", self.ssid);
        self.platform_associate()?;
        info!("WiFi: connected to '{}'", self.ssid);
        Ok(())
    }

    fn ssid(&self) -> &str {
        &self.ssid
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
