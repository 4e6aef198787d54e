//! Content download verification.
//!
//! Publishing content in Pulp 3 takes several resources. Given a repository:
//!
//! 1. A publication is created from the repository's latest version (a
//!    repository version plus metadata).
//! 2. A distribution is created from the publication. It defines the base URL
//!    the publication is served at, and which schemes serve it.
//!
//! The verifier creates, syncs, publishes and distributes a repository, picks
//! one content unit at random, and downloads it from the fixture origin and
//! from the service. For every scheme under test the served bytes must hash
//! to the origin digest when the scheme is enabled, and the request must fail
//! when it is disabled. Every resource is deleted afterwards, pass or fail.

mod error;
mod report;

pub use error::VerifyError;
pub use report::{RunOutcome, Scheme, SchemeOutcome, VerificationReport};

use anyhow::{anyhow, Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde_json::Value;
use url::Url;

use crate::api::{ApiError, Client, Method, ResponseHandler};
use crate::bugs::{BugGate, BUG_DISABLED_SCHEME_REJECTED, BUG_HTTPS_DISTRIBUTION};
use crate::checksum::sha256_bytes;
use crate::cleanup::CleanupStack;
use crate::config::PdvConfig;
use crate::fetch::{self, FetchOptions};
use crate::pulp::{self, paths};
use crate::version::PulpVersion;

/// Runs the download verification against one service.
pub struct ContentDownloadVerifier {
    cfg: PdvConfig,
    version: PulpVersion,
    client: Client,
    bugs: Box<dyn BugGate>,
    rng: StdRng,
}

impl ContentDownloadVerifier {
    /// Verifier talking to the configured service over libcurl.
    pub fn new(cfg: PdvConfig, bugs: Box<dyn BugGate>) -> Result<Self> {
        let client = Client::new(&cfg, ResponseHandler::Json)?;
        Self::with_client(cfg, client, bugs)
    }

    pub fn with_client(cfg: PdvConfig, client: Client, bugs: Box<dyn BugGate>) -> Result<Self> {
        Ok(Self {
            version: cfg.pulp_version()?,
            cfg,
            client,
            bugs,
            rng: StdRng::from_entropy(),
        })
    }

    /// Make the content unit choice reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Check preconditions, then run the verification.
    ///
    /// Returns `Skipped` when the service cannot be verified, `Passed` when
    /// every scheme behaved, and an error otherwise. Errors wrap
    /// [`ApiError`], [`fetch::FetchError`] or [`VerifyError`].
    pub fn run(&mut self) -> Result<RunOutcome> {
        if let Some(reason) = pulp::require_pulp_3(&self.version) {
            tracing::info!("skipping: {}", reason);
            return Ok(RunOutcome::Skipped(reason));
        }
        if let Some(reason) = pulp::require_pulp_plugins(&self.client, &[paths::FILE_PLUGIN])? {
            tracing::info!("skipping: {}", reason);
            return Ok(RunOutcome::Skipped(reason));
        }

        let Self {
            cfg,
            version,
            client,
            bugs,
            rng,
        } = self;
        let report = verify_downloads(cfg, version, client, &**bugs, rng)?;
        tracing::info!(unit = %report.unit_name, "download verification passed");
        Ok(RunOutcome::Passed(report))
    }
}

fn join_url(base: &str, relative: &str) -> Result<String> {
    let base = Url::parse(base).with_context(|| format!("invalid URL {:?}", base))?;
    let joined = base
        .join(relative)
        .with_context(|| format!("cannot join {:?} onto {}", relative, base))?;
    Ok(joined.into())
}

/// `<scheme>://<base_url>/<unit>`. A scheme already present in `base_url` is
/// replaced.
fn unit_url(scheme: Scheme, base_url: &str, unit_name: &str) -> Result<String> {
    let host_path = base_url
        .split_once("://")
        .map_or(base_url, |(_, rest)| rest)
        .trim_end_matches('/');
    join_url(&format!("{}://{}/", scheme, host_path), unit_name)
}

fn verify_downloads(
    cfg: &PdvConfig,
    version: &PulpVersion,
    client: &Client,
    bugs: &dyn BugGate,
    rng: &mut StdRng,
) -> Result<VerificationReport> {
    client.set_response_handler(ResponseHandler::Json);
    let mut cleanup = CleanupStack::new();

    tracing::info!("creating repository and importer");
    let repo = client.post(paths::REPO_PATH, &pulp::gen_repo())?.into_json()?;
    cleanup.register_delete(client, pulp::href(&repo)?);
    let feed_url = join_url(&cfg.fixtures.file_feed_url, paths::FILE_MANIFEST)?;
    let importer = client
        .post(paths::FILE_IMPORTER_PATH, &pulp::gen_importer(&feed_url))?
        .into_json()?;
    cleanup.register_delete(client, pulp::href(&importer)?);
    pulp::sync_repo(client, &importer, &repo)?;

    tracing::info!("creating publisher and publication");
    let publisher = client
        .post(paths::FILE_PUBLISHER_PATH, &pulp::gen_publisher())?
        .into_json()?;
    cleanup.register_delete(client, pulp::href(&publisher)?);
    let publication = pulp::publish_repo(client, &publisher, &repo)?;
    cleanup.register_delete(client, pulp::href(&publication)?);

    tracing::info!("creating distribution");
    let body = pulp::gen_distribution(pulp::href(&publication)?);
    let distribution = client.post(paths::DISTRIBUTION_PATH, &body)?.into_json()?;
    cleanup.register_delete(client, pulp::href(&distribution)?);

    let names = pulp::get_content_unit_names(client, &repo)?;
    let unit_name = names
        .choose(rng)
        .cloned()
        .ok_or_else(|| VerifyError::NoContentUnits {
            repo: pulp::href(&repo).unwrap_or_default().to_string(),
        })?;
    tracing::info!(unit = %unit_name, candidates = names.len(), "picked content unit");

    let origin_url = join_url(&cfg.fixtures.file_url, &unit_name)?;
    let origin_digest = sha256_bytes(&fetch::http_get(&origin_url, FetchOptions::default())?);

    client.set_response_handler(ResponseHandler::Safe);
    let mut schemes = vec![Scheme::Http];
    if bugs.is_testable(BUG_HTTPS_DISTRIBUTION, version) {
        schemes.push(Scheme::Https);
    }

    let mut outcomes = Vec::with_capacity(schemes.len());
    for scheme in schemes {
        let outcome = check_scheme(
            client,
            bugs,
            version,
            &distribution,
            scheme,
            &unit_name,
            &origin_digest,
        )?;
        tracing::info!(scheme = %scheme, "{}", outcome);
        outcomes.push((scheme, outcome));
    }

    Ok(VerificationReport {
        unit_name,
        origin_url,
        origin_digest,
        schemes: outcomes,
    })
}

fn check_scheme(
    client: &Client,
    bugs: &dyn BugGate,
    version: &PulpVersion,
    distribution: &Value,
    scheme: Scheme,
    unit_name: &str,
    origin_digest: &str,
) -> Result<SchemeOutcome> {
    let url = unit_url(scheme, pulp::str_field(distribution, "base_url")?, unit_name)?;
    let enabled = distribution
        .get(scheme.as_str())
        .and_then(Value::as_bool)
        .ok_or(VerifyError::SchemeFlagMissing { scheme })?;

    if enabled {
        let response = client
            .request_with(ResponseHandler::Safe, Method::Get, &url, None)?
            .into_response()
            .ok_or_else(|| anyhow!("GET {} returned no raw response", url))?;
        let digest = sha256_bytes(&response.body);
        if digest != origin_digest {
            return Err(VerifyError::DigestMismatch {
                scheme,
                unit: unit_name.to_string(),
                expected: origin_digest.to_string(),
                actual: digest,
            }
            .into());
        }
        return Ok(SchemeOutcome::Matched { url, digest });
    }

    if !bugs.is_testable(BUG_DISABLED_SCHEME_REJECTED, version) {
        return Ok(SchemeOutcome::Unchecked {
            url,
            bug: BUG_DISABLED_SCHEME_REJECTED,
        });
    }
    match client.request_with(ResponseHandler::Safe, Method::Get, &url, None) {
        Ok(_) => Err(VerifyError::DisabledSchemeServed { scheme, url }.into()),
        Err(ApiError::Http { status, .. }) => Ok(SchemeOutcome::Rejected { url, status }),
        Err(e) => Err(e.into()),
    }
}
