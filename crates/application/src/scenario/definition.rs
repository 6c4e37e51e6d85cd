//! Scenario definitions and the context their builders run in.

use std::fmt;
use std::sync::Arc;

use echocheck_domain::request::parse_http_url;
use echocheck_domain::{Assertion, DomainError, DomainResult, RequestSpec};
use url::Url;

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::ValueGenerator;

type RequestBuilderFn = dyn Fn(&ScenarioContext) -> DomainResult<RequestSpec> + Send + Sync;
type AssertionBuilderFn = dyn Fn(&RequestSpec) -> Vec<Assertion> + Send + Sync;

/// What a request builder can see: the target base URL and the value
/// generator for randomised inputs.
#[derive(Clone)]
pub struct ScenarioContext {
    base_url: Url,
    generator: Arc<dyn ValueGenerator>,
}

impl ScenarioContext {
    /// Creates a context for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::Configuration`] when the base URL is not
    /// an absolute http(s) URL. This is the one error that aborts a run.
    pub fn new(base_url: &str, generator: Arc<dyn ValueGenerator>) -> ApplicationResult<Self> {
        let mut base_url = parse_http_url(base_url)
            .map_err(|e| ApplicationError::Configuration(format!("base URL: {e}")))?;
        // Joining "get" onto ".../api" would replace "api" otherwise.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            generator,
        })
    }

    /// The base URL, always ending in `/`.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves `path` (e.g. `get` or `/delay/1`) against the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidUrl`] if the result is not a valid URL.
    pub fn url(&self, path: &str) -> DomainResult<String> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map(String::from)
            .map_err(|e| DomainError::InvalidUrl(format!("{e}: {path}")))
    }

    /// Draws a value in `0..upper` from the injected generator.
    #[must_use]
    pub fn random_below(&self, upper: u32) -> u32 {
        self.generator.next_below(upper)
    }
}

impl fmt::Debug for ScenarioContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioContext")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// A named test case: how to build its request and which assertions to
/// apply to the response.
///
/// The assertion builder receives the request that was actually sent, so
/// expectations can refer to generated values.
pub struct Scenario {
    name: String,
    request: Box<RequestBuilderFn>,
    assertions: Box<AssertionBuilderFn>,
}

impl Scenario {
    /// Creates a scenario.
    pub fn new<R, A>(name: impl Into<String>, request: R, assertions: A) -> Self
    where
        R: Fn(&ScenarioContext) -> DomainResult<RequestSpec> + Send + Sync + 'static,
        A: Fn(&RequestSpec) -> Vec<Assertion> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            request: Box::new(request),
            assertions: Box::new(assertions),
        }
    }

    /// Scenario name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds the request for this run.
    ///
    /// # Errors
    ///
    /// Propagates validation errors from the builder.
    pub fn build_request(&self, context: &ScenarioContext) -> DomainResult<RequestSpec> {
        (self.request)(context)
    }

    /// Builds the assertions for a sent request.
    #[must_use]
    pub fn build_assertions(&self, request: &RequestSpec) -> Vec<Assertion> {
        (self.assertions)(request)
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ports::FixedValueGenerator;
    use pretty_assertions::assert_eq;

    fn context(base: &str) -> ApplicationResult<ScenarioContext> {
        ScenarioContext::new(base, Arc::new(FixedValueGenerator::new(42)))
    }

    #[test]
    fn joins_paths_onto_base_url() {
        let ctx = context("https://httpbin.org").unwrap();
        assert_eq!(ctx.url("get").unwrap(), "https://httpbin.org/get");
        assert_eq!(ctx.url("/delay/1").unwrap(), "https://httpbin.org/delay/1");

        let nested = context("http://127.0.0.1:8080/echo").unwrap();
        assert_eq!(nested.url("post").unwrap(), "http://127.0.0.1:8080/echo/post");
    }

    #[test]
    fn malformed_base_url_is_a_configuration_error() {
        assert!(matches!(
            context("not a url"),
            Err(ApplicationError::Configuration(_))
        ));
        assert!(matches!(
            context("file:///tmp/x"),
            Err(ApplicationError::Configuration(_))
        ));
    }

    #[test]
    fn builders_see_generated_values() {
        let ctx = context("https://httpbin.org/").unwrap();
        let scenario = Scenario::new(
            "random name",
            |ctx: &ScenarioContext| {
                RequestSpec::get(ctx.url("get")?)
                    .query("name", format!("User{}", ctx.random_below(1000)))
                    .build()
            },
            |req: &RequestSpec| {
                let name = req.query().get("name").cloned().unwrap_or_default();
                vec![Assertion::body_field("args.name", name)]
            },
        );

        let request = scenario.build_request(&ctx).unwrap();
        assert_eq!(request.query().get("name").map(String::as_str), Some("User42"));
        assert_eq!(
            scenario.build_assertions(&request),
            vec![Assertion::body_field("args.name", "User42")]
        );
    }
}
