use crate::Result;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::ImageExt;
use testcontainers::{ContainerAsync, GenericImage};
use typed_builder::TypedBuilder;

const MYSQL_PORT: u16 = 3306;
const INIT_DIR: &str = "/docker-entrypoint-initdb.d";

#[derive(Debug, Clone, TypedBuilder)]
pub struct MysqlConfig {
    #[builder(default = "8.4".to_string(), setter(into))]
    tag: String,
    #[builder(default = "linkhop".to_string(), setter(into))]
    database: String,
    #[builder(default = "linkhop".to_string(), setter(into))]
    username: String,
    #[builder(default = "linkhop".to_string(), setter(into))]
    password: String,
    /// SQL run by the image entrypoint against `database` on first boot.
    #[builder(default, setter(strip_option, into))]
    schema: Option<String>,
}

/// Test fixture for a disposable MySQL server.
///
/// The entrypoint restarts the server after applying `schema`, so the
/// first "ready" log line can precede the final one. Callers should retry
/// their first connection.
pub struct MySqlServer {
    container: ContainerAsync<GenericImage>,
    config: MysqlConfig,
}

impl MySqlServer {
    pub async fn new(config: MysqlConfig) -> Result<Self> {
        let image = GenericImage::new("mysql", config.tag.as_str())
            .with_exposed_port(MYSQL_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stderr("ready for connections"))
            .with_env_var("MYSQL_DATABASE", config.database.as_str())
            .with_env_var("MYSQL_USER", config.username.as_str())
            .with_env_var("MYSQL_PASSWORD", config.password.as_str())
            .with_env_var("MYSQL_ROOT_PASSWORD", "root");

        let container = match &config.schema {
            Some(schema) => {
                image
                    .with_copy_to(
                        format!("{INIT_DIR}/00-schema.sql"),
                        schema.clone().into_bytes(),
                    )
                    .start()
                    .await?
            }
            None => image.start().await?,
        };

        Ok(Self { container, config })
    }

    pub async fn host(&self) -> Result<String> {
        let host = self.container.get_host().await?.to_string();

        match host.as_str() {
            "localhost" => Ok(String::from("127.0.0.1")),
            _ => Ok(host),
        }
    }

    pub async fn port(&self) -> Result<u16> {
        Ok(self.container.get_host_port_ipv4(MYSQL_PORT).await?)
    }

    /// DSN for the configured user and database, e.g. for `sqlx`.
    pub async fn database_url(&self) -> Result<String> {
        let host = self.host().await?;
        let port = self.port().await?;
        Ok(format!(
            "mysql://{}:{}@{}:{}/{}",
            self.config.username, self.config.password, host, port, self.config.database
        ))
    }

    pub fn container(&self) -> &ContainerAsync<GenericImage> {
        &self.container
    }
}
