use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// 國家名稱 -> 該國大學清單
pub type CountryResult = BTreeMap<String, Vec<UniversityRecord>>;

/// 呼叫端提交的國家清單，保留原始順序與重複項
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRequest {
    pub countries: Vec<String>,
}

/// 目錄服務回傳的單筆大學資料
///
/// 來源不受信任，任何欄位都可能缺少或型別錯誤：
/// 可選字串缺少、為 null 或型別不符時為 `None`，
/// 清單欄位同理退回空清單，清單中的非字串項目會被丟棄。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniversityRecord {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub web_pages: Vec<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub alpha_two_code: Option<String>,
    #[serde(default)]
    pub domains: Vec<String>,
}

impl UniversityRecord {
    /// 從原始 JSON 物件寬鬆地建立記錄；非物件回傳 `None`
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        Some(Self {
            country: string_field(obj, "country"),
            web_pages: string_list(obj, "web_pages"),
            name: string_field(obj, "name"),
            alpha_two_code: string_field(obj, "alpha_two_code"),
            domains: string_list(obj, "domains"),
        })
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

fn string_list(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    match obj.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// 合併單一國家結果，重複的國家以後者覆蓋
pub fn merge_into(target: &mut CountryResult, partial: CountryResult) {
    for (country, universities) in partial {
        target.insert(country, universities);
    }
}
