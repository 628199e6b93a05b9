use std::sync::Once;

use idgenerator::{error::OptionError, IdGeneratorOptions, IdInstance};

static INIT: Once = Once::new();

const DEFAULT_WORKER_ID: u32 = 1;

// 雪花id，只初始化一次
pub fn init(worker_id: u32) -> Result<(), OptionError> {
    let mut result = Ok(());
    INIT.call_once(|| {
        let options = IdGeneratorOptions::new().worker_id(worker_id).worker_id_bit_len(6);
        result = IdInstance::init(options);
    });
    result
}

pub fn next_id() -> i64 {
    if !INIT.is_completed() {
        if let Err(e) = init(DEFAULT_WORKER_ID) {
            log::warn!("id generator fallback init failed: {:?}", e);
        }
    }
    IdInstance::next_id()
}
