//! HDFS inspection client for the storage backend under verification.
//!
//! Talks to the cluster over its HTTP REST file API, in either of the two
//! flavours a Cosmos-style deployment exposes: HttpFS (the gateway on port
//! 14000) or plain WebHDFS on the namenode. Both flavours share the
//! `/webhdfs/v1` path space, so the distinction only selects the port the
//! properties file must name. The client also checks the cluster release
//! against the configured one through the master's cluster-info endpoint.

use std::{fmt, str::FromStr};

use log::{debug, info};
use serde::Deserialize;
use url::Url;

use crate::{
    config::HadoopProperties,
    error::{AcceptanceError, Result},
};

/// REST flavour exposed by the cluster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HdfsApi {
    /// The HttpFS gateway.
    HttpFs,
    /// WebHDFS on the namenode.
    WebHdfs,
}

impl FromStr for HdfsApi {
    type Err = AcceptanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "httpfs" => Ok(Self::HttpFs),
            "webhdfs" => Ok(Self::WebHdfs),
            _ => Err(AcceptanceError::Config(format!(
                "unknown hdfs api {s:?} (expected httpfs or webhdfs)"
            ))),
        }
    }
}

impl fmt::Display for HdfsApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::HttpFs => "httpfs",
            Self::WebHdfs => "webhdfs",
        })
    }
}

#[derive(Deserialize)]
struct ClusterInfoReport {
    #[serde(rename = "clusterInfo")]
    cluster_info: ClusterInfo,
}

#[derive(Deserialize)]
struct ClusterInfo {
    #[serde(rename = "hadoopVersion")]
    hadoop_version: String,
}

/// Client for inspecting and cleaning the HDFS side of a scenario.
#[derive(Clone, Debug)]
pub struct HadoopClient {
    http: reqwest::Client,
    base: Url,
    manager_url: Url,
    user: String,
    verify_version: bool,
    expected_version: String,
}

impl HadoopClient {
    /// Build a client from the hadoop section of the properties file.
    ///
    /// # Errors
    ///
    /// Returns [`AcceptanceError::Config`] for an unknown `api` value and
    /// [`AcceptanceError::Url`] for malformed endpoints.
    pub fn new(props: &HadoopProperties) -> Result<Self> {
        let api: HdfsApi = props.api.parse()?;
        let base = Url::parse(&format!("http://{}:{}/webhdfs/v1/", props.host, props.port))?;
        let manager_url = Url::parse(&props.manager_url)?;
        info!("hdfs client using the {api} api at {base}");
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            manager_url,
            user: props.user.clone(),
            verify_version: props.verify_version,
            expected_version: props.version.clone(),
        })
    }

    /// Whether the installed-correctly step should check the cluster
    /// version, per the properties file.
    #[must_use]
    pub fn verify_version(&self) -> bool { self.verify_version }

    /// HDFS user owning the persisted datasets.
    #[must_use]
    pub fn user(&self) -> &str { &self.user }

    /// Check the cluster release against the configured one.
    ///
    /// Queries the master's cluster-info endpoint and compares the
    /// reported `hadoopVersion` with the expected release prefix.
    ///
    /// # Errors
    ///
    /// Returns [`AcceptanceError::VersionMismatch`] on disagreement, or a
    /// transport/status error if the endpoint is unreachable.
    pub async fn manager_version(&self) -> Result<()> {
        let url = self.manager_url.join("ws/v1/cluster/info")?;
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(AcceptanceError::UnexpectedStatus {
                operation: "cluster info",
                status: response.status().as_u16(),
            });
        }
        let report: ClusterInfoReport = response.json().await?;
        let found = report.cluster_info.hadoop_version;
        if found.starts_with(&self.expected_version) {
            info!("hadoop version {found} matches expected {}", self.expected_version);
            Ok(())
        } else {
            Err(AcceptanceError::VersionMismatch {
                component: "hadoop",
                expected: self.expected_version.clone(),
                found,
            })
        }
    }

    /// Recursively delete the tenant directory under the suite user.
    ///
    /// An already-absent directory is not an error, so scenarios stay
    /// idempotent across reruns. An empty tenant is rejected; the
    /// recursive delete would otherwise target the whole user tree.
    ///
    /// # Errors
    ///
    /// Returns [`AcceptanceError::Config`] for an empty tenant, a
    /// transport error, or [`AcceptanceError::UnexpectedStatus`] for any
    /// status other than success or 404.
    pub async fn delete_directory(&self, tenant: &str) -> Result<()> {
        if tenant.is_empty() {
            return Err(AcceptanceError::Config(
                "refusing to delete an empty tenant directory".into(),
            ));
        }
        let url = self.op_url(&format!("user/{}/{tenant}", self.user), "DELETE", &[(
            "recursive", "true",
        )])?;
        info!("deleting hdfs directory user/{}/{tenant}", self.user);
        let response = self.http.delete(url).send().await?;
        let status = response.status();
        if status.is_success() || status.as_u16() == 404 {
            Ok(())
        } else {
            Err(AcceptanceError::UnexpectedStatus {
                operation: "delete directory",
                status: status.as_u16(),
            })
        }
    }

    /// Read a file's full text content.
    ///
    /// # Errors
    ///
    /// Returns a transport error or [`AcceptanceError::UnexpectedStatus`]
    /// when the file cannot be opened.
    pub async fn read_file(&self, path: &str) -> Result<String> {
        let url = self.op_url(path, "OPEN", &[])?;
        debug!("reading hdfs file {path}");
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(AcceptanceError::UnexpectedStatus {
                operation: "open file",
                status: response.status().as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    /// Whether a file or directory exists.
    ///
    /// # Errors
    ///
    /// Returns a transport error or [`AcceptanceError::UnexpectedStatus`]
    /// for statuses other than success or 404.
    pub async fn exists(&self, path: &str) -> Result<bool> {
        let url = self.op_url(path, "GETFILESTATUS", &[])?;
        let response = self.http.get(url).send().await?;
        match response.status().as_u16() {
            s if (200..300).contains(&s) => Ok(true),
            404 => Ok(false),
            s => Err(AcceptanceError::UnexpectedStatus {
                operation: "file status",
                status: s,
            }),
        }
    }

    fn op_url(&self, path: &str, op: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.base.join(path.trim_start_matches('/'))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("op", op);
            query.append_pair("user.name", &self.user);
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn client() -> HadoopClient {
        HadoopClient::new(&HadoopProperties::default()).expect("default properties are valid")
    }

    #[rstest]
    #[case("httpfs", HdfsApi::HttpFs)]
    #[case("HTTPFS", HdfsApi::HttpFs)]
    #[case("webhdfs", HdfsApi::WebHdfs)]
    fn api_parses_known_flavours(#[case] raw: &str, #[case] expected: HdfsApi) {
        assert_eq!(raw.parse::<HdfsApi>().expect("parses"), expected);
    }

    #[rstest]
    fn api_rejects_unknown_flavours() {
        assert!("nfs".parse::<HdfsApi>().is_err());
    }

    #[rstest]
    #[case(HdfsApi::HttpFs, "httpfs")]
    #[case(HdfsApi::WebHdfs, "webhdfs")]
    fn api_displays_its_flavour(#[case] api: HdfsApi, #[case] expected: &str) {
        assert_eq!(api.to_string(), expected);
    }

    #[rstest]
    fn op_url_targets_webhdfs_path_space() {
        let url = client()
            .op_url("user/opendata/t1/room.txt", "OPEN", &[])
            .expect("valid url");
        assert_eq!(url.path(), "/webhdfs/v1/user/opendata/t1/room.txt");
        let query = url.query().expect("has query");
        assert!(query.contains("op=OPEN"));
        assert!(query.contains("user.name=opendata"));
    }

    #[rstest]
    fn op_url_appends_extra_params() {
        let url = client()
            .op_url("user/opendata/t1", "DELETE", &[("recursive", "true")])
            .expect("valid url");
        assert!(url.query().expect("has query").contains("recursive=true"));
    }
}
