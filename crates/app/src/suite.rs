//! Default scenario suite for httpbin-compatible echo services.

use echocheck_application::{Scenario, ScenarioContext};
use echocheck_domain::{Assertion, HttpMethod, RequestSpec, StructuredValue};

/// Upper bound (exclusive) for the generated user number.
const RANDOM_USER_RANGE: u32 = 1000;

/// The ten contract checks run by the binary.
#[must_use]
pub fn httpbin_scenarios() -> Vec<Scenario> {
    vec![
        post_without_status_check(),
        get_echoes_query(),
        post_echoes_json(),
        custom_user_agent(),
        custom_header(),
        delayed_response(),
        random_query_value(),
        delete_with_mixed_case_content_type(),
        put_echoes_json(),
        head_has_content_type(),
    ]
}

fn post_without_status_check() -> Scenario {
    Scenario::new(
        "POST without status check",
        |ctx: &ScenarioContext| {
            RequestSpec::post(ctx.url("post")?)
                .fail_on_status_code(false)
                .build()
        },
        |_: &RequestSpec| vec![Assertion::status(200)],
    )
}

fn get_echoes_query() -> Scenario {
    Scenario::new(
        "GET echoes query parameters",
        |ctx: &ScenarioContext| {
            RequestSpec::get(ctx.url("get")?)
                .query("name", "Ania")
                .query("age", 25)
                .build()
        },
        |request: &RequestSpec| {
            vec![
                Assertion::status(200),
                Assertion::body_field("args", StructuredValue::mapping(request.query().clone())),
            ]
        },
    )
}

fn post_echoes_json() -> Scenario {
    Scenario::new(
        "POST echoes JSON body",
        |ctx: &ScenarioContext| {
            RequestSpec::post(ctx.url("post")?)
                .body(StructuredValue::mapping([("name", "Natalia"), ("job", "tester")]))
                .build()
        },
        echoed_json,
    )
}

fn custom_user_agent() -> Scenario {
    Scenario::new(
        "custom User-Agent is echoed",
        |ctx: &ScenarioContext| {
            RequestSpec::post(ctx.url("post")?)
                .header("User-Agent", "MyTestAgent/1.0")
                .body(StructuredValue::mapping([("test", "header-check")]))
                .build()
        },
        |_: &RequestSpec| {
            vec![
                Assertion::status(200),
                Assertion::body_field("headers.User-Agent", "MyTestAgent/1.0"),
            ]
        },
    )
}

fn custom_header() -> Scenario {
    Scenario::new(
        "custom header is echoed",
        |ctx: &ScenarioContext| {
            RequestSpec::get(ctx.url("headers")?)
                .header("X-Custom-Headers", "My value")
                .build()
        },
        |_: &RequestSpec| {
            vec![
                Assertion::status(200),
                Assertion::body_field("headers.X-Custom-Headers", "My value"),
            ]
        },
    )
}

fn delayed_response() -> Scenario {
    Scenario::new(
        "delayed response takes over a second",
        |ctx: &ScenarioContext| RequestSpec::get(ctx.url("delay/1")?).build(),
        |_: &RequestSpec| {
            vec![
                Assertion::status(200),
                Assertion::DurationGreaterThan { ms: 1000 },
            ]
        },
    )
}

fn random_query_value() -> Scenario {
    Scenario::new(
        "GET echoes generated query value",
        |ctx: &ScenarioContext| {
            let name = format!("User{}", ctx.random_below(RANDOM_USER_RANGE));
            RequestSpec::get(ctx.url("get")?).query("name", name).build()
        },
        |request: &RequestSpec| {
            let name = request.query().get("name").cloned().unwrap_or_default();
            vec![
                Assertion::status(200),
                Assertion::body_field("args.name", name),
            ]
        },
    )
}

fn delete_with_mixed_case_content_type() -> Scenario {
    Scenario::new(
        "DELETE echoes JSON body",
        |ctx: &ScenarioContext| {
            RequestSpec::builder(HttpMethod::Delete, ctx.url("delete")?)
                .header("Content-Type", "application/JSON")
                .body(StructuredValue::mapping([("id", "123"), ("reason", "test-case")]))
                .build()
        },
        echoed_json,
    )
}

fn put_echoes_json() -> Scenario {
    Scenario::new(
        "PUT echoes JSON body",
        |ctx: &ScenarioContext| {
            RequestSpec::builder(HttpMethod::Put, ctx.url("put")?)
                .body(StructuredValue::mapping([
                    ("name", StructuredValue::from("Natalia")),
                    ("age", StructuredValue::from(100)),
                ]))
                .build()
        },
        echoed_json,
    )
}

fn head_has_content_type() -> Scenario {
    Scenario::new(
        "HEAD returns content-type",
        |ctx: &ScenarioContext| RequestSpec::builder(HttpMethod::Head, ctx.url("get")?).build(),
        |_: &RequestSpec| {
            vec![
                Assertion::status(200),
                Assertion::header_present("content-type"),
            ]
        },
    )
}

/// Status 200 and the sent body echoed back under `json`.
fn echoed_json(request: &RequestSpec) -> Vec<Assertion> {
    let sent = request.body().cloned().unwrap_or_default();
    vec![Assertion::status(200), Assertion::body_field("json", sent)]
}
