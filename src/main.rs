//! Creative Vault backend - binary entry point
//! Delegates to the library for all app logic.

#[tokio::main]
async fn main() {
    vault_backend::run().await;
}
