use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

/// An API base URL nothing listens on.
fn unreachable_api() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api/")
}

#[test]
fn test_empty_cart_redirects_to_cart() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!());
    cmd.env("CHECKOUT_API_BASE_URL", unreachable_api())
        .arg("checkout")
        .arg("tests/fixtures/empty_cart.csv");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Redirecting to /cart"));

    Ok(())
}

#[test]
fn test_malformed_cart_rows_reported() {
    let mut cmd = Command::new(cargo_bin!("storefront-checkout"));
    cmd.env("CHECKOUT_API_BASE_URL", unreachable_api())
        .arg("checkout")
        .arg("tests/fixtures/malformed_cart.csv");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading cart line"))
        .stdout(predicate::str::contains("Redirecting to /cart"));
}

#[test]
fn test_verify_without_session_id_redirects_home() {
    let mut cmd = Command::new(cargo_bin!("storefront-checkout"));
    cmd.env("CHECKOUT_API_BASE_URL", unreachable_api())
        .arg("verify")
        .arg("/checkout/success");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Redirecting to /").and(predicate::str::contains("/cart").not()));
}

#[test]
fn test_offline_checkout_fails_with_retry_hint() {
    let mut cmd = Command::new(cargo_bin!("storefront-checkout"));
    cmd.env("CHECKOUT_API_BASE_URL", unreachable_api())
        .arg("checkout")
        .arg("tests/fixtures/cart.csv");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("You appear to be offline"))
        .stderr(predicate::str::contains("retry"))
        .stderr(predicate::str::contains("Details:").not());
}

#[test]
fn test_show_details_flag() {
    let mut cmd = Command::new(cargo_bin!("storefront-checkout"));
    cmd.env("CHECKOUT_API_BASE_URL", unreachable_api())
        .arg("--show-details")
        .arg("verify")
        .arg("/checkout/success?session_id=cs_123");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("contact support"))
        .stderr(predicate::str::contains("Details:"));
}

#[test]
fn test_invalid_config_value() {
    let mut cmd = Command::new(cargo_bin!("storefront-checkout"));
    cmd.env("CHECKOUT_MAX_POLL_ATTEMPTS", "lots")
        .arg("checkout")
        .arg("tests/fixtures/empty_cart.csv");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("CHECKOUT_MAX_POLL_ATTEMPTS"));
}
