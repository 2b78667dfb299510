#[tokio::main]
async fn main() {
    detailing_backend::run().await;
}
