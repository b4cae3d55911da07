// Copyright 2025 JiangLong.
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

//! Stack declaration and execution

pub mod context;
pub mod output;
pub mod program;
pub mod webapp;

pub use self::context::{ResourceRecord, StackContext, StackSummary};
pub use self::output::Output;
pub use self::program::{declare_load_balancer, deploy_stack, Collaborators};
pub use self::webapp::{WebApp, WebAppArgs};
