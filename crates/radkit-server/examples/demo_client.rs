use radkit_proto::{
    auth::{encrypt_user_password, generate_request_authenticator, verify_response_authenticator},
    AttributeType, AttributeValue, Code, Message,
};
use std::net::UdpSocket;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 4 {
        eprintln!(
            "Usage: {} <username> <password> <secret> [auth_addr] [acct_addr]",
            args[0]
        );
        eprintln!(
            "Example: {} admin admin123 testing123 127.0.0.1:1645 127.0.0.1:1646",
            args[0]
        );
        std::process::exit(1);
    }

    let username = &args[1];
    let password = &args[2];
    let secret = args[3].as_bytes();
    let auth_addr = args.get(4).map(|s| s.as_str()).unwrap_or("127.0.0.1:1645");
    let acct_addr = args.get(5).map(|s| s.as_str()).unwrap_or("127.0.0.1:1646");

    println!("RADIUS Client Test");
    println!("==================");
    println!("Authentication: {}", auth_addr);
    println!("Accounting:     {}", acct_addr);
    println!("Username: {}", username);
    println!();

    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.set_read_timeout(Some(Duration::from_secs(5)))?;

    // --- Access-Request ---
    let request_auth = generate_request_authenticator();
    let mut request = Message::new(Code::AccessRequest, 1, request_auth);
    request.add_attribute(AttributeType::UserName, username.as_str().into());
    let encrypted = encrypt_user_password(password, secret, &request_auth)?;
    request.add_attribute(AttributeType::UserPassword, AttributeValue::Text(encrypted));
    request.add_attribute(
        AttributeType::NasIpAddress,
        std::net::Ipv4Addr::new(127, 0, 0, 1).into(),
    );

    let wire = request.encode()?;
    println!("Sending Access-Request ({} bytes)...", wire.len());
    socket.send_to(&wire, auth_addr)?;

    let mut buffer = vec![0u8; 4096];
    let (len, _) = match socket.recv_from(&mut buffer) {
        Ok(received) => received,
        Err(e) => {
            eprintln!("\n✗ No response from server: {}", e);
            eprintln!("  Make sure the RADIUS server is running on {}", auth_addr);
            return Err(e.into());
        }
    };

    println!("Received response ({} bytes)", len);
    if verify_response_authenticator(&buffer[..len], &request_auth, secret) {
        println!("Response Authenticator verified");
    } else {
        println!("⚠️  Response Authenticator did NOT verify (wrong secret?)");
    }

    let response = Message::parse(&buffer[..len], secret)?;
    let accepted = match response.code {
        Code::AccessAccept => {
            println!("\n✓ Authentication SUCCESSFUL!");
            true
        }
        Code::AccessReject => {
            println!("\n✗ Authentication FAILED!");
            false
        }
        other => {
            println!("\n? Unexpected response: {}", other);
            false
        }
    };
    for value in response.get_all(AttributeType::ReplyMessage) {
        if let Some(msg) = value.as_text() {
            println!("  Message: {}", msg);
        }
    }

    if !accepted {
        return Ok(());
    }

    // --- Accounting Start / Stop ---
    let session_id = format!("demo-{}", std::process::id());
    println!("\nStarting accounting session {}...", session_id);

    for (identifier, status, extra) in [
        (2u8, 1u32, None),
        (3u8, 2u32, Some((120u32, 4096u32, 8192u32))),
    ] {
        let acct_auth = generate_request_authenticator();
        let mut acct = Message::new(Code::AccountingRequest, identifier, acct_auth);
        acct.add_attribute(AttributeType::AcctStatusType, status.into());
        acct.add_attribute(AttributeType::AcctSessionId, session_id.as_str().into());
        acct.add_attribute(AttributeType::UserName, username.as_str().into());
        acct.add_attribute(
            AttributeType::NasIpAddress,
            std::net::Ipv4Addr::new(127, 0, 0, 1).into(),
        );
        if let Some((session_time, input, output)) = extra {
            acct.add_attribute(AttributeType::AcctSessionTime, session_time.into());
            acct.add_attribute(AttributeType::AcctInputOctets, input.into());
            acct.add_attribute(AttributeType::AcctOutputOctets, output.into());
        }

        socket.send_to(&acct.encode()?, acct_addr)?;
        let (len, _) = socket.recv_from(&mut buffer)?;
        let ack = Message::parse(&buffer[..len], secret)?;
        let label = if status == 1 { "Start" } else { "Stop" };
        println!(
            "  {} acknowledged: {} (identifier {})",
            label, ack.code, ack.identifier
        );
    }

    println!("\nDone.");
    Ok(())
}
