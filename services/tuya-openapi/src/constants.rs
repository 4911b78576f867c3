// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

/// Env holding the endpoint, for example `https://openapi.tuyaeu.com`.
pub const TUYA_ENDPOINT: &str = "TUYA_ENDPOINT";
/// Env holding the access id of the cloud project.
pub const TUYA_ACCESS_ID: &str = "TUYA_ACCESS_ID";
/// Env holding the access secret of the cloud project.
pub const TUYA_ACCESS_SECRET: &str = "TUYA_ACCESS_SECRET";

/// Endpoint of the America data center.
pub const DEFAULT_ENDPOINT: &str = "https://openapi.tuyaus.com";

// Headers used in signing. Names are case sensitive on the wire.
pub const CLIENT_ID: &str = "client_id";
pub const TIMESTAMP: &str = "t";
pub const SIGN_METHOD: &str = "sign_method";
pub const LANG: &str = "lang";
pub const SIGNATURE_HEADERS: &str = "Signature-Headers";
pub const NONCE: &str = "nonce";
pub const SIGN: &str = "sign";
pub const ACCESS_TOKEN: &str = "access_token";

pub const HMAC_SHA256: &str = "HMAC-SHA256";
pub const LANG_ZH: &str = "zh";

// Paths of the calls issued by the client.
pub const TOKEN_PATH: &str = "/v1.0/token?grant_type=1";
pub const SWITCH_CODE: &str = "switch_1";

pub fn device_commands_path(device_id: &str) -> String {
    format!("/v1.0/iot-03/devices/{device_id}/commands")
}
