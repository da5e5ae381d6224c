// Copyright 2021 Dmitry Tantsur <dtantsur@protonmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Quality of Service: policies, their rules and supported rule types.

use crate::protocol_enum;

pub mod policies;
pub mod rules;
pub mod ruletypes;

protocol_enum! {
    #[doc = "Direction of traffic a rule applies to."]
    enum Direction {
        #[doc = "Traffic leaving the port."]
        Egress = "egress",
        #[doc = "Traffic entering the port."]
        Ingress = "ingress"
    }
}
