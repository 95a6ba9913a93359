use axum::body;
use serde::de::DeserializeOwned;

/// Reads a whole response body and parses it as JSON into [T], failing the test if either step fails
pub async fn deserialize_body<T: DeserializeOwned>(response_body: body::Body) -> T {
    let bytes = body::to_bytes(response_body, usize::MAX)
        .await
        .expect("Could not read data from response body!");

    serde_json::from_slice(&bytes).unwrap_or_else(|err| {
        panic!(
            "Could not parse response body as JSON! Error: {}, Received body: {:?}",
            err, bytes
        )
    })
}
