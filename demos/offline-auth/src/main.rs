use std::sync::Arc;

use tokio::sync::oneshot;
use yggforge::prelude::*;

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

const ACCOUNTS: &[(&str, &str, &str)] = &[
    ("steve@example.com", "hunter2", "Steve"),
    ("alex@example.com", "correct horse", "Alex"),
];

fn seed(authority: &MemoryAuthority) -> Result<(), YggforgeError> {
    for (username, password, player) in ACCOUNTS {
        let user_id = authority.register_user(username, password)?;
        let profile = authority.register_profile(user_id, player)?;
        tracing::info!(%user_id, profile = %profile.profile_id, player, "account seeded");
    }
    Ok(())
}

fn login(username: &str, password: &str) -> AuthRequest {
    AuthRequest {
        agent: Some(Default::default()),
        username: username.into(),
        password: password.into(),
        client_token: None,
        request_user: true,
    }
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// Offline identifiers, the same ones a vanilla server in offline mode
/// would assign.
fn show_identifiers() -> Result<(), YggforgeError> {
    println!("== offline identifiers ==");
    for name in ["Notch", "Steve", "Alex", "Bob"] {
        let id = derive_from_name(name);
        let undashed = id.to_string();
        let dashed = to_dashed(&undashed)?;
        println!("{name:>6}  {undashed}  {dashed}");
        debug_assert_eq!(to_undashed(&dashed)?, undashed);
    }
    println!("random  {}", random_identifier());
    Ok(())
}

/// The launcher flow against an in-process authority.
async fn local_flow(authority: Arc<MemoryAuthority>) -> Result<(), YggforgeError> {
    println!("== local flow ==");
    let client = YggdrasilClient::local(authority.clone());

    let first = client
        .authenticate(&login("steve@example.com", "hunter2"))
        .await?;
    let player = first.selected_profile.as_ref().map(|p| p.name.as_str());
    println!("authenticated as {player:?}, client token {}", first.client_token);

    let check = |token: &str| ValidateRequest {
        access_token: token.to_string(),
        client_token: None,
    };
    println!("validate: {}", client.validate(&check(&first.access_token)).await?);

    let second = client
        .refresh(&RefreshRequest {
            access_token: first.access_token.clone(),
            client_token: Some(first.client_token.clone()),
            request_user: false,
            selected_profile: None,
        })
        .await?;
    println!(
        "refreshed; old token valid: {}, new token valid: {}",
        client.validate(&check(&first.access_token)).await?,
        client.validate(&check(&second.access_token)).await?,
    );

    client
        .invalidate(&InvalidateRequest {
            access_token: second.access_token.clone(),
            client_token: second.client_token.clone(),
        })
        .await?;
    println!(
        "invalidated; live sessions: {}",
        authority.session_count()
    );

    match client
        .authenticate(&login("steve@example.com", "HUNTER2"))
        .await
    {
        Err(err) => println!("wrong password refused: {err}"),
        Ok(_) => println!("wrong password accepted?!"),
    }
    Ok(())
}

/// The same flow over real HTTP, on a port picked by the OS.
async fn http_flow(authority: Arc<MemoryAuthority>) -> Result<(), YggforgeError> {
    println!("== http flow ==");
    let server = YggforgeServer::builder()
        .bind("127.0.0.1:0")
        .build(authority)
        .await?;
    let addr = server.local_addr()?;

    let (stop, stopped) = oneshot::channel::<()>();
    let task = tokio::spawn(server.run_until(async {
        let _ = stopped.await;
    }));

    let client = YggdrasilClient::http(format!("http://{addr}"))?;
    let session = client
        .authenticate(&login("alex@example.com", "correct horse"))
        .await?;
    println!(
        "authenticated over http at {addr}: user {:?}",
        session.user.as_ref().map(|u| u.id.as_str())
    );
    client
        .sign_out(&SignoutRequest {
            username: "alex@example.com".into(),
            password: "correct horse".into(),
        })
        .await?;
    println!(
        "signed out; token still valid: {}",
        client
            .validate(&ValidateRequest {
                access_token: session.access_token,
                client_token: None,
            })
            .await?
    );

    let _ = stop.send(());
    match task.await {
        Ok(result) => result?,
        Err(join) => tracing::error!(error = %join, "server task failed"),
    }
    println!("server stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    yggforge::init_tracing();

    let config = ServerConfig::from_env()?;
    let authority = Arc::new(config.memory_authority());
    seed(&authority)?;

    show_identifiers()?;
    local_flow(Arc::clone(&authority)).await?;
    http_flow(authority).await?;
    Ok(())
}
