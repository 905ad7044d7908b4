use triex_transport::TrieClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let addr = std::env::args().nth(1).unwrap_or_else(|| "127.0.0.1:61135".to_string());
    let mut client = TrieClient::connect(addr.as_str()).await?;

    for word in ["car", "carpet", "cart", "dog"] {
        println!("{}", client.add(word).await?);
    }
    println!("{}", client.search("cart").await?);
    println!("{}", client.autocomplete("car").await?);
    println!("{}", client.delete("car").await?);
    println!("{}", client.delete("car").await?);
    println!("{}", client.list_fast().await?);
    println!("{}", client.list_full().await?);

    Ok(())
}
