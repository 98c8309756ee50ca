use std::net::SocketAddr;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

// Interactive client: relays stdin lines to the server with a network newline
// and prints whatever the server sends back.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let server_addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| format!("127.0.0.1:{}", shared::PORT))
        .parse::<SocketAddr>()?;

    println!("Connecting to {}", server_addr);
    let stream = TcpStream::connect(server_addr).await?;
    let (read_half, mut write_half) = stream.into_split();

    // Print server output as it arrives
    let printer = tokio::spawn(async move {
        let mut lines = BufReader::new(read_half).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => println!("{}", line.trim_end_matches('\r')),
                Ok(None) => {
                    println!("Server closed the connection");
                    break;
                }
                Err(e) => {
                    println!("Error reading from server: {}", e);
                    break;
                }
            }
        }
    });

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = stdin.next_line().await? {
        let mut outgoing = line.into_bytes();
        outgoing.extend_from_slice(shared::LINE_END.as_bytes());
        if let Err(e) = write_half.write_all(&outgoing).await {
            println!("Failed to send: {}", e);
            break;
        }
        if printer.is_finished() {
            break;
        }
    }

    println!("Test client finished");
    Ok(())
}
