//
//  logging conveniences used throughout the service.  full_info! prefixes the
//  message with the source location so per-game traces stay greppable.

#[macro_export]
macro_rules! full_info {
    ($($arg:tt)*) => {
        log::info!("[{}:{}] {}", file!(), line!(), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_return_err {
    ( $e:expr ) => {{
        log::error!("\t{}\n {:#?}", $e, $e);
        return Err($e);
    }};
}
