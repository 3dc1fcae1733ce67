use std::env;

fn main() {
    println!("cargo:rerun-if-changed=.env");
    println!("cargo:rerun-if-env-changed=FEEDBACK_ENDPOINT");
    println!("cargo:rerun-if-env-changed=FEEDBACK_SHEET_NAME");

    // Load .env file during build so the endpoint can be baked in
    if let Err(e) = dotenvy::dotenv() {
        println!("cargo:warning=BUILD.RS: No .env file loaded ({}). Using system environment variables.", e);
    }

    // Embedded values are only a fallback; runtime configuration wins.
    if let Ok(endpoint) = env::var("FEEDBACK_ENDPOINT") {
        println!("cargo:rustc-env=FEEDBACK_ENDPOINT={}", endpoint);
        println!("cargo:warning=Embedded FEEDBACK_ENDPOINT (length: {})", endpoint.len());
    }

    if let Ok(sheet_name) = env::var("FEEDBACK_SHEET_NAME") {
        println!("cargo:rustc-env=FEEDBACK_SHEET_NAME={}", sheet_name);
    }
}
