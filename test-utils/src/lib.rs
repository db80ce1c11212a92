//! `test-utils` is used for testing in both `urlinfo-lib` and `urlinfo-bin`.
//! This crate does not depend on `urlinfo-lib` or `urlinfo-bin`, else we would get dependency cycles.
//! Macros are used instead, so that the importer is responsible for providing the dependencies.

/// Create a mock web server, which answers both `HEAD` and `GET` requests
/// with a predefined status.
///
/// Additional builder calls on the response template can be appended, e.g.
/// `mock_server!(200, insert_header("content-type", "text/html"))`.
#[macro_export]
macro_rules! mock_server {
    ($status:expr $(, $func:tt ($($arg:expr),*))*) => {{
        let mock_server = wiremock::MockServer::start().await;
        let response_template = wiremock::ResponseTemplate::new(http::StatusCode::from($status));
        let template = response_template$(.$func($($arg),*))*;
        wiremock::Mock::given(wiremock::matchers::method("HEAD")).respond_with(template.clone()).mount(&mock_server).await;
        wiremock::Mock::given(wiremock::matchers::method("GET")).respond_with(template).mount(&mock_server).await;
        mock_server
    }};
}

/// Create a mock web server serving an HTML document.
///
/// The probe (`HEAD`) only sees the content type, the `GET` request receives
/// the body. The `GET` route is expected to be hit exactly `$gets` times.
#[macro_export]
macro_rules! html_mock_server {
    ($body:expr) => {
        $crate::html_mock_server!($body, 1)
    };
    ($body:expr, $gets:expr) => {{
        let mock_server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("HEAD"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html; charset=utf-8"),
            )
            .mount(&mock_server)
            .await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_raw(String::from($body), "text/html; charset=utf-8"),
            )
            .expect($gets)
            .mount(&mock_server)
            .await;
        mock_server
    }};
}

/// Get the path to the `fixtures` directory.
#[macro_export]
macro_rules! fixtures_path {
    () => {
        std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .unwrap()
            .join("fixtures")
    };
}

/// Loads a fixture from the `fixtures` directory
#[macro_export]
macro_rules! load_fixture {
    ($filename:expr) => {{
        let path = $crate::fixtures_path!().join($filename);
        std::fs::read_to_string(path).unwrap()
    }};
}

/// Gets the "main" binary name (e.g. `urlinfo`)
#[macro_export]
macro_rules! main_command {
    () => {
        assert_cmd::cargo::cargo_bin_cmd!("urlinfo")
    };
}
