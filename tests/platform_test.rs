//! Platform detection from the kernel release string.

mod common;

use common::{Reply, ScriptedRunner};

use wifi_provision::Platform;

#[tokio::test]
async fn yocto_kernel_selects_connman() {
    let runner = ScriptedRunner::new();
    runner.script("uname -r", vec![Reply::Ok("4.14.98-yocto-standard")]);

    assert_eq!(Platform::detect(&runner).await, Platform::Connman);
}

#[tokio::test]
async fn other_kernels_select_wpa_supplicant() {
    let runner = ScriptedRunner::new();
    runner.script("uname -r", vec![Reply::Ok("6.1.21-v8+")]);

    assert_eq!(Platform::detect(&runner).await, Platform::WpaSupplicant);
}

#[tokio::test]
async fn detection_failure_falls_back_to_wpa_supplicant() {
    let runner = ScriptedRunner::new();
    runner.script("uname -r", vec![Reply::Fail("uname: not found")]);

    assert_eq!(Platform::detect(&runner).await, Platform::WpaSupplicant);
}
