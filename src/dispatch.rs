//! Call Dispatch
//!
//! Maps named registry functions (`register-ip`, `get-ip-info`, ...) onto
//! [`IpRegistry`] operations and folds their results into tagged
//! [`Outcome`] values. Callers arrive already authenticated; the dispatcher
//! only forwards their principal.

use crate::error::{Error, Result};
use crate::registry::{IpId, IpRecord, IpRegistry, Principal, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

// =============================================================================
// Calls
// =============================================================================

/// A registry call, tagged by function name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "function", rename_all = "kebab-case")]
pub enum Call {
    RegisterIp {
        title: String,
        description: String,
        expiration: Timestamp,
    },
    GetIpInfo {
        id: IpId,
    },
    IsIpActive {
        id: IpId,
    },
    TransferIp {
        id: IpId,
        #[serde(rename = "new-owner")]
        new_owner: Principal,
    },
    SetIpStatus {
        id: IpId,
        #[serde(rename = "is-active")]
        is_active: bool,
    },
}

impl Call {
    /// Every function name the dispatcher understands
    pub const FUNCTIONS: [&'static str; 5] = [
        "register-ip",
        "get-ip-info",
        "is-ip-active",
        "transfer-ip",
        "set-ip-status",
    ];

    pub fn function(&self) -> &'static str {
        match self {
            Call::RegisterIp { .. } => "register-ip",
            Call::GetIpInfo { .. } => "get-ip-info",
            Call::IsIpActive { .. } => "is-ip-active",
            Call::TransferIp { .. } => "transfer-ip",
            Call::SetIpStatus { .. } => "set-ip-status",
        }
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// Value produced by a successful call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CallResult {
    /// Id of a newly registered record
    Id(IpId),
    /// Active flag, or `true` as the acknowledgement of a mutation
    Flag(bool),
    Record(IpRecord),
}

/// Tagged result of a dispatched call.
///
/// Serializes as `{"success":true,"result":...}` or
/// `{"success":false,"error":<code>,"message":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<CallResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Outcome {
    pub fn success(result: CallResult) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
            message: None,
        }
    }

    pub fn failure(error: &Error) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.code()),
            message: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

impl From<Result<CallResult>> for Outcome {
    fn from(result: Result<CallResult>) -> Self {
        match result {
            Ok(value) => Outcome::success(value),
            Err(err) => Outcome::failure(&err),
        }
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Routes calls from authenticated principals to a registry
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<IpRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<IpRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<IpRegistry> {
        &self.registry
    }

    /// Run a call and return the raw result
    pub fn execute(&self, caller: &Principal, call: Call) -> Result<CallResult> {
        debug!(function = call.function(), caller = %caller, "dispatching call");

        match call {
            Call::RegisterIp {
                title,
                description,
                expiration,
            } => Ok(CallResult::Id(
                self.registry.register(caller, title, description, expiration),
            )),
            Call::GetIpInfo { id } => self.registry.get_info(id).map(CallResult::Record),
            Call::IsIpActive { id } => self.registry.is_active(id).map(CallResult::Flag),
            Call::TransferIp { id, new_owner } => self
                .registry
                .transfer(caller, id, new_owner)
                .map(|()| CallResult::Flag(true)),
            Call::SetIpStatus { id, is_active } => self
                .registry
                .set_status(caller, id, is_active)
                .map(|()| CallResult::Flag(true)),
        }
    }

    /// Run a call and fold the result into an [`Outcome`]
    pub fn call(&self, caller: &Principal, call: Call) -> Outcome {
        let function = call.function();
        Self::finish(function, self.execute(caller, call))
    }

    /// Run a call given by function name and a JSON object of arguments
    pub fn call_named(&self, caller: &Principal, function: &str, args: Value) -> Outcome {
        let result = Self::decode(function, args).and_then(|call| self.execute(caller, call));
        Self::finish(function, result)
    }

    fn finish(function: &str, result: Result<CallResult>) -> Outcome {
        if let Err(err) = &result {
            // NotFound / NotAuthorized are ordinary answers; anything else
            // means the request never reached the registry.
            if err.is_registry_error() {
                debug!(function, code = err.code(), "call failed: {}", err);
            } else {
                warn!(function, code = err.code(), "call rejected: {}", err);
            }
        }
        result.into()
    }

    fn decode(function: &str, args: Value) -> Result<Call> {
        if !Call::FUNCTIONS.contains(&function) {
            return Err(Error::UnknownFunction(function.to_string()));
        }

        let mut args = match args {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(Error::InvalidArguments {
                    function: function.to_string(),
                    reason: format!("expected an object, got {}", other),
                })
            }
        };
        args.insert("function".to_string(), Value::String(function.to_string()));

        serde_json::from_value(Value::Object(args)).map_err(|e| Error::InvalidArguments {
            function: function.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn principal(name: &str) -> Principal {
        Principal::new(name).unwrap()
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(IpRegistry::new())
    }

    #[test]
    fn test_call_names_match_serde_tags() {
        let calls = [
            Call::RegisterIp {
                title: "T".into(),
                description: "D".into(),
                expiration: 0,
            },
            Call::GetIpInfo { id: IpId::new(1) },
            Call::IsIpActive { id: IpId::new(1) },
            Call::TransferIp {
                id: IpId::new(1),
                new_owner: principal("bob"),
            },
            Call::SetIpStatus {
                id: IpId::new(1),
                is_active: true,
            },
        ];

        for (call, name) in calls.iter().zip(Call::FUNCTIONS) {
            assert_eq!(call.function(), name);
            assert_eq!(serde_json::to_value(call).unwrap()["function"], name);
        }
    }

    #[test]
    fn test_register_then_get_info_by_name() {
        let dispatcher = dispatcher();
        let alice = principal("alice");

        let outcome = dispatcher.call_named(
            &alice,
            "register-ip",
            json!({ "title": "Test IP", "description": "desc", "expiration": 123 }),
        );
        assert!(outcome.is_success());
        assert_eq!(outcome.result, Some(CallResult::Id(IpId::new(1))));

        let outcome = dispatcher.call_named(&alice, "get-ip-info", json!({ "id": 1 }));
        match outcome.result {
            Some(CallResult::Record(record)) => {
                assert_eq!(record.title, "Test IP");
                assert_eq!(record.expiration_date, 123);
                assert_eq!(record.owner, alice);
            }
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn test_error_codes_in_outcomes() {
        let dispatcher = dispatcher();
        let alice = principal("alice");
        let bob = principal("bob");

        let missing = dispatcher.call_named(&alice, "transfer-ip", json!({ "id": 1, "new-owner": "bob" }));
        assert!(!missing.success);
        assert_eq!(missing.error, Some(1));

        dispatcher.call(
            &alice,
            Call::RegisterIp {
                title: "T".into(),
                description: "D".into(),
                expiration: 0,
            },
        );
        let denied = dispatcher.call_named(&bob, "set-ip-status", json!({ "id": 1, "is-active": false }));
        assert_eq!(denied.error, Some(2));
        assert!(denied.result.is_none());

        let allowed = dispatcher.call_named(&alice, "set-ip-status", json!({ "id": 1, "is-active": false }));
        assert_eq!(allowed.result, Some(CallResult::Flag(true)));

        let active = dispatcher.call_named(&bob, "is-ip-active", json!({ "id": 1 }));
        assert_eq!(active.result, Some(CallResult::Flag(false)));
    }

    #[test]
    fn test_is_active_unknown_id_is_not_false() {
        let dispatcher = dispatcher();
        let alice = principal("alice");

        let missing = dispatcher.call_named(&alice, "is-ip-active", json!({ "id": 1 }));
        assert!(!missing.success);
        assert_eq!(missing.error, Some(1));
        assert!(missing.result.is_none());

        dispatcher.call_named(
            &alice,
            "register-ip",
            json!({ "title": "T", "description": "D", "expiration": 0 }),
        );
        dispatcher.call_named(&alice, "set-ip-status", json!({ "id": 1, "is-active": false }));

        let inactive = dispatcher.call_named(&alice, "is-ip-active", json!({ "id": 1 }));
        assert!(inactive.success);
        assert_eq!(inactive.result, Some(CallResult::Flag(false)));
        assert!(inactive.error.is_none());
    }

    #[test]
    fn test_non_positive_ids_report_not_found() {
        let dispatcher = dispatcher();
        let alice = principal("alice");
        dispatcher.call_named(
            &alice,
            "register-ip",
            json!({ "title": "T", "description": "D", "expiration": 0 }),
        );

        for id in [-1, 0] {
            let calls = [
                ("get-ip-info", json!({ "id": id })),
                ("is-ip-active", json!({ "id": id })),
                ("transfer-ip", json!({ "id": id, "new-owner": "bob" })),
                ("set-ip-status", json!({ "id": id, "is-active": false })),
            ];
            for (function, args) in calls {
                let outcome = dispatcher.call_named(&alice, function, args);
                assert_eq!(outcome.error, Some(1), "{} with id {}", function, id);
                assert_eq!(
                    outcome.message,
                    Some(format!("IP record not found: {}", id)),
                );
            }
        }
    }

    #[test]
    fn test_unknown_function() {
        let outcome = dispatcher().call_named(&principal("alice"), "delete-ip", json!({ "id": 1 }));
        assert_eq!(outcome.error, Some(3));
        assert_eq!(outcome.message.as_deref(), Some("Function not found: delete-ip"));
    }

    #[test]
    fn test_malformed_arguments() {
        let dispatcher = dispatcher();
        let alice = principal("alice");

        let missing_field = dispatcher.call_named(&alice, "get-ip-info", json!({}));
        assert_eq!(missing_field.error, Some(4));

        let empty_owner =
            dispatcher.call_named(&alice, "transfer-ip", json!({ "id": 1, "new-owner": "" }));
        assert_eq!(empty_owner.error, Some(4));

        let not_object = dispatcher.call_named(&alice, "get-ip-info", json!([1]));
        assert_eq!(not_object.error, Some(4));
    }

    #[test]
    fn test_outcome_wire_shape() {
        let ok = serde_json::to_value(Outcome::success(CallResult::Id(IpId::new(1)))).unwrap();
        assert_eq!(ok, json!({ "success": true, "result": 1 }));

        let err = Error::NotFound { id: IpId::new(9) };
        let failed = serde_json::to_value(Outcome::failure(&err)).unwrap();
        assert_eq!(
            failed,
            json!({ "success": false, "error": 1, "message": "IP record not found: 9" })
        );
    }
}
