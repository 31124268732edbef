//! Column names and fixed nested schemas of the transaction feed.

pub const CC_NUM: &str = "cc_num";
pub const AMOUNT: &str = "amt";
pub const CATEGORY: &str = "category";
pub const IS_FRAUD: &str = "is_fraud";
pub const TRANS_DATE_TRANS_TIME: &str = "trans_date_trans_time";
pub const MERCH_LAST_UPDATE_TIME: &str = "merch_last_update_time";
pub const MERCH_EFF_TIME: &str = "merch_eff_time";
pub const PERSONAL_DETAIL: &str = "personal_detail";

/// Top-level columns of the feed. The loader provides each one, as an all-null string column
/// when the source never mentions it.
pub const RAW_COLUMNS: [&str; 8] = [
    CC_NUM,
    AMOUNT,
    CATEGORY,
    IS_FRAUD,
    TRANS_DATE_TRANS_TIME,
    MERCH_LAST_UPDATE_TIME,
    MERCH_EFF_TIME,
    PERSONAL_DETAIL,
];

pub const PERSONAL_DETAIL_JSON: &str = "personal_detail_json";
pub const ADDRESS_JSON: &str = "address_json";
pub const CC_NUM_MASKED: &str = "cc_num_masked";

/// Fields decoded out of the `personal_detail` string, in declaration order.
pub const PERSONAL_DETAIL_FIELDS: [&str; 8] = [
    "person_name",
    "gender",
    "address",
    "lat",
    "long",
    "city_pop",
    "job",
    "dob",
];

/// Fields decoded out of `personal_detail_json.address`.
pub const ADDRESS_FIELDS: [&str; 4] = ["street", "city", "state", "zip"];

/// Columns the flattener adds, in output order.
pub const FLATTENED_COLUMNS: [&str; 12] = [
    "first", "last", "gender", "dob", "street", "city", "state", "zip", "lat", "long",
    "city_pop", "job",
];

/// Epoch-microsecond columns relabelled into the target zone.
pub const EPOCH_MICROS_COLUMNS: [&str; 2] = [MERCH_LAST_UPDATE_TIME, MERCH_EFF_TIME];

/// Columns that must never reach the processed output.
pub const EXCLUDED_OUTPUT_COLUMNS: [&str; 4] =
    [PERSONAL_DETAIL, PERSONAL_DETAIL_JSON, ADDRESS_JSON, CC_NUM];
