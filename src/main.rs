#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    lingua_booking::run().await
}
