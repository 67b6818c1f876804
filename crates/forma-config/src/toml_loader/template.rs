//! Default TOML config template with inline documentation comments.

pub(crate) fn default_config_toml() -> &'static str {
    r##"# Forma Configuration
# Only override what you want to change -- missing fields use defaults.

[api]
# base_url = "http://localhost:8000"
# token = ""              # prefer the FORMA_TOKEN environment variable

[stream]
# content_path = "/agent/content/stream"
# agent_path = "/agent/runs/stream"
# connect_timeout_secs = 10   # 1-120

[logging]
# level = "info"          # trace, debug, info, warn, error
"##
}
