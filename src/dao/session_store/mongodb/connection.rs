use std::time::Duration;

use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use tokio::time::sleep;
use tracing::debug;

use super::error::{MongoDaoError, MongoResult};

/// Bounded exponential backoff applied while waiting for a fresh deployment to answer.
#[derive(Debug, Clone, Copy)]
struct PingBackoff {
    attempts: u32,
    first: Duration,
    ceiling: Duration,
}

impl Default for PingBackoff {
    fn default() -> Self {
        Self {
            attempts: 10,
            first: Duration::from_millis(250),
            ceiling: Duration::from_secs(5),
        }
    }
}

impl PingBackoff {
    fn delays(self) -> impl Iterator<Item = Duration> {
        let ceiling = self.ceiling;
        std::iter::successors(Some(self.first), move |delay| Some((*delay * 2).min(ceiling)))
            .take(self.attempts.saturating_sub(1) as usize)
    }
}

/// Build a client for `options`, select `database_name`, and wait for a successful ping.
pub async fn establish_connection(
    options: &ClientOptions,
    database_name: &str,
) -> MongoResult<Database> {
    let client = Client::with_options(options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(database_name);
    let backoff = PingBackoff::default();

    let mut delays = backoff.delays();
    let mut attempts = 0;
    loop {
        attempts += 1;
        let err = match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => return Ok(database),
            Err(err) => err,
        };
        let Some(delay) = delays.next() else {
            return Err(MongoDaoError::InitialPing {
                attempts,
                source: err,
            });
        };
        debug!(attempts, error = %err, "MongoDB ping failed; retrying");
        sleep(delay).await;
    }
}
