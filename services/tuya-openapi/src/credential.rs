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

use std::fmt::{Debug, Formatter};

use tuyasign_core::{utils::Redact, SigningCredential};

/// Credential for the Tuya OpenAPI, issued per cloud project.
#[derive(Clone)]
pub struct Credential {
    /// Access id (client id) of the cloud project.
    pub access_id: String,
    /// Access secret (client secret) of the cloud project.
    pub access_secret: String,
}

impl Credential {
    /// Create a new credential.
    pub fn new(access_id: impl Into<String>, access_secret: impl Into<String>) -> Self {
        Self {
            access_id: access_id.into(),
            access_secret: access_secret.into(),
        }
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_id", &Redact::from(&self.access_id))
            .field("access_secret", &Redact::from(&self.access_secret))
            .finish()
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        !self.access_id.is_empty() && !self.access_secret.is_empty()
    }
}
