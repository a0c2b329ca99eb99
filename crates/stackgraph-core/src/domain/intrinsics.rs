//! CloudFormation intrinsic functions and pseudo parameters as JSON values.

use crate::domain::value_objects::LogicalId;
use serde_json::{Value, json};

pub fn reference(id: &LogicalId) -> Value {
    json!({ "Ref": id.as_str() })
}

pub fn get_att(id: &LogicalId, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [id.as_str(), attribute] })
}

/// Import a value exported by another stack.
pub fn import_value(export_name: &str) -> Value {
    json!({ "Fn::ImportValue": export_name })
}

pub fn join(separator: &str, parts: Vec<Value>) -> Value {
    json!({ "Fn::Join": [separator, parts] })
}

pub fn split(separator: &str, source: Value) -> Value {
    json!({ "Fn::Split": [separator, source] })
}

pub fn select(index: usize, list: Value) -> Value {
    json!({ "Fn::Select": [index, list] })
}

/// `Fn::Sub` with an explicit variable map.
pub fn sub(template: &str, variables: Value) -> Value {
    json!({ "Fn::Sub": [template, variables] })
}

pub fn availability_zones() -> Value {
    json!({ "Fn::GetAZs": "" })
}

// ── Pseudo parameters ────────────────────────────────────────────────────────

pub fn region() -> Value {
    json!({ "Ref": "AWS::Region" })
}

pub fn account_id() -> Value {
    json!({ "Ref": "AWS::AccountId" })
}

pub fn partition() -> Value {
    json!({ "Ref": "AWS::Partition" })
}

pub fn url_suffix() -> Value {
    json!({ "Ref": "AWS::URLSuffix" })
}

/// ARN of an AWS managed IAM policy in the current partition.
pub fn managed_policy_arn(name: &str) -> Value {
    join("", vec![
        json!("arn:"),
        partition(),
        json!(format!(":iam::aws:policy/{name}")),
    ])
}
