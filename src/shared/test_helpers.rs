use std::future::Future;
use std::time::Duration;

use fake::faker::internet::en::SafeEmail;
use fake::Fake;

use crate::backend::identity::Credentials;

/// Poll `condition` until it holds, panicking after two seconds.
///
/// Feed deliveries run on a spawned pump, so assertions about a replica must
/// wait for the event to land instead of racing it.
pub async fn eventually<F, Fut>(condition: F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Duration::from_secs(2);
    let poll = async {
        loop {
            if condition().await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    };
    tokio::time::timeout(deadline, poll)
        .await
        .expect("condition not reached within deadline");
}

/// Random but well-formed credentials for sign-up fixtures
pub fn fake_credentials() -> Credentials {
    Credentials {
        email: SafeEmail().fake(),
        password: "hunter2222".to_string(),
    }
}
