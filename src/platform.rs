//! Per-target shell command tables.
//!
//! Each supported hardware target provisions through a different command
//! family: wpa_supplicant-based images drive `wpa_cli`/`iwlist` directly,
//! while connman-based images go through `connmanctl` and a connman service
//! config file. A [`PlatformCommandSet`] is selected once at startup and
//! injected read-only into every component; nothing else in the crate
//! branches on the platform.

use log::{debug, warn};

use crate::command::CommandRunner;

/// The command families this crate knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// `wpa_cli`/`iwlist` against wpa_supplicant, with hostapd + udhcpd for
    /// the configuration AP (Raspbian-style images).
    WpaSupplicant,
    /// `connmanctl`, with hostapd units that bundle their own DHCP setup
    /// (Yocto-style images).
    Connman,
}

impl Platform {
    /// Detects the platform from the running kernel.
    ///
    /// Yocto-built kernels tag their release string, and those images ship
    /// connman; everything else gets the wpa_supplicant family. Detection
    /// failure falls back to wpa_supplicant with a warning rather than
    /// aborting startup.
    pub async fn detect(runner: &dyn CommandRunner) -> Self {
        match runner.run("uname -r", &[]).await {
            Ok(release) if release.contains("yocto") => {
                debug!("detected yocto kernel ({release}); using connman commands");
                Self::Connman
            }
            Ok(release) => {
                debug!("kernel {release}; using wpa_supplicant commands");
                Self::WpaSupplicant
            }
            Err(e) => {
                warn!("platform detection failed ({e}); assuming wpa_supplicant");
                Self::WpaSupplicant
            }
        }
    }
}

/// The shell command template for each provisioning operation.
///
/// Immutable once selected; shared read-only across all components.
/// Templates that take user input (`define_network`, `define_open_network`)
/// receive it via the `SSID` and `PSK` environment variables only.
#[derive(Debug, Clone)]
pub struct PlatformCommandSet {
    /// Which command family this set belongs to.
    pub platform: Platform,
    /// The status token that means "fully connected". Every other token,
    /// including transitional ones, is treated as not yet connected.
    pub connected_token: &'static str,
    /// Prints the current connection state token.
    pub status: &'static str,
    /// Prints the SSID of the current network, or nothing when unassociated.
    pub connected_network: &'static str,
    /// Prints visible SSIDs, one per line, best signal first, hidden
    /// networks omitted.
    pub scan: &'static str,
    /// Prints the names of known (saved) networks, one per line.
    pub known_networks: &'static str,
    /// Starts broadcasting the configuration access point.
    pub start_ap: &'static str,
    /// Stops the configuration access point.
    pub stop_ap: &'static str,
    /// Persists a passphrase-protected network from `$SSID`/`$PSK`.
    pub define_network: &'static str,
    /// Persists an open network from `$SSID`.
    pub define_open_network: &'static str,
}

impl PlatformCommandSet {
    /// Returns the command set for the given platform.
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::WpaSupplicant => Self::wpa_supplicant(),
            Platform::Connman => Self::connman(),
        }
    }

    /// The wpa_supplicant command family.
    ///
    /// Scanning parses `iwlist` output into `quality\tssid` pairs, sorts by
    /// quality descending, and drops empty or NUL-bearing names. Network
    /// definitions go through `wpa_cli add_network`/`set_network` and are
    /// saved to the supplicant config.
    pub fn wpa_supplicant() -> Self {
        Self {
            platform: Platform::WpaSupplicant,
            connected_token: "COMPLETED",
            status: r#"wpa_cli -iwlan0 status | sed -n -e '/^wpa_state=/{s/wpa_state=//;p;q}'"#,
            connected_network: r#"wpa_cli -iwlan0 status | sed -n -e '/^ssid=/{s/ssid=//;p;q}'"#,
            scan: r#"iwlist wlan0 scan |
sed -n -e '
  /Quality=/,/ESSID:/H
  /ESSID:/{
    g
    s/^.*Quality=\([0-9]\+\).*ESSID:"\([^"]*\)".*$/\1\t\2/
    p
    s/.*//
    x
  }' |
sort -nr |
cut -f 2 |
sed -e '/^$/d;/\x00/d'"#,
            known_networks: r#"wpa_cli -iwlan0 list_networks | sed -e '1d' | cut -f 2"#,
            start_ap: "ifconfig wlan0 10.0.0.1 && systemctl start hostapd && systemctl start udhcpd",
            stop_ap: "systemctl stop udhcpd && systemctl stop hostapd && ifconfig wlan0 0.0.0.0",
            define_network: r#"ID=`wpa_cli -iwlan0 add_network` && wpa_cli -iwlan0 set_network $ID ssid \"$SSID\" && wpa_cli -iwlan0 set_network $ID psk \"$PSK\" && wpa_cli -iwlan0 enable_network $ID && wpa_cli -iwlan0 save_config"#,
            define_open_network: r#"ID=`wpa_cli -iwlan0 add_network` && wpa_cli -iwlan0 set_network $ID ssid \"$SSID\" && wpa_cli -iwlan0 set_network $ID key_mgmt NONE && wpa_cli -iwlan0 enable_network $ID && wpa_cli -iwlan0 save_config"#,
        }
    }

    /// The connman command family.
    ///
    /// Status still comes from wpa_cli (connman drives wpa_supplicant
    /// underneath, and its state token is the reliable signal). The AP unit
    /// on these images bundles its own IP/DHCP setup, and scanning stays
    /// broken after an AP teardown until wifi is toggled, hence the
    /// disable/enable in `stop_ap`. Network definitions are written as a
    /// connman service config file.
    pub fn connman() -> Self {
        Self {
            platform: Platform::Connman,
            connected_token: "COMPLETED",
            status: r#"wpa_cli -iwlan0 status | sed -n -e '/^wpa_state=/{s/wpa_state=//;p;q}'"#,
            connected_network: r#"wpa_cli -iwlan0 status | sed -n -e '/^ssid=/{s/ssid=//;p;q}'"#,
            scan: r#"connmanctl scan wifi && connmanctl services | sed -e 's/^[*A-z]* *\(.*\) *wifi.*$/\1/' | grep .+*"#,
            known_networks: r#"connmanctl services | grep '^[^ ]*A' | sed -e 's/^[A-z]* *\(.*\) *wifi.*$/\1/' | grep .+*"#,
            start_ap: "systemctl start hostapd",
            stop_ap: "systemctl stop hostapd && connmanctl disable wifi && connmanctl enable wifi",
            define_network: r#"cat << EOF > /var/lib/connman/wifi.config
[service_provision]
Type = wifi
Security = wpa2
Name = $SSID
Passphrase = $PSK
EOF"#,
            define_open_network: r#"cat << EOF > /var/lib/connman/wifi.config
[service_provision]
Type = wifi
Name = $SSID
EOF"#,
        }
    }
}
