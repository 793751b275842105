#[macro_export]
macro_rules! include_res {
    (str, $p:expr) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
}

pub fn landing() -> &'static str {
    include_res!(str, "/pages/landing.txt")
}

pub fn chat_help() -> &'static str {
    include_res!(str, "/pages/chat_help.txt")
}
