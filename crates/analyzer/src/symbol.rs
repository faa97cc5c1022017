/*
 * Copyright (c) 2026. Mikhail Kulik.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! The compilation-wide registry of declarations.
//!
//! The table owns the identifier factory: every [`Identifier`] in a symbolic
//! program was issued by [`SymbolTable::fresh`], in a deterministic pre-order
//! walk of the input, so identical inputs produce identical tables. The name
//! analyzer mutates the table while it runs; afterwards the table is only
//! ever handed out by shared reference.

use ast::symbolic::{Identifier, Type};
use std::collections::HashMap;

/// Signature of a function, user-defined or built-in.
#[derive(Debug, Clone)]
pub struct FunSig {
    pub arg_types: Vec<Type>,
    pub ret_type: Type,
    /// Module the function is declared in.
    pub owner: Identifier,
}

/// Signature of a case-class constructor.
#[derive(Debug, Clone)]
pub struct ConstrSig {
    pub arg_types: Vec<Type>,
    /// The abstract class this constructor extends.
    pub parent: Identifier,
    /// 0-based declaration order among the siblings sharing `parent`;
    /// becomes the runtime tag of allocated instances.
    pub index: usize,
}

impl ConstrSig {
    /// Constructor calls produce a value of the parent class.
    pub fn ret_type(&self) -> Type {
        Type::Class(self.parent)
    }
}

/// The identifiers of the built-in `Std` module and its functions.
#[derive(Debug, Clone, Copy)]
pub struct StdLib {
    pub module: Identifier,
    pub print_int: Identifier,
    pub print_string: Identifier,
    pub read_int: Identifier,
    pub read_string: Identifier,
    pub int_to_string: Identifier,
    pub digit_to_string: Identifier,
}

#[derive(Debug)]
pub struct SymbolTable {
    next_id: u32,
    /// Debug name of every issued identifier.
    names: HashMap<Identifier, String>,
    modules: HashMap<String, Identifier>,
    /// Type id → owning module. Case classes appear here too: a class type
    /// may name either an abstract class or a case class.
    types: HashMap<Identifier, Identifier>,
    /// Abstract class → its constructors, in declaration order.
    constructors_of: HashMap<Identifier, Vec<Identifier>>,
    functions: HashMap<Identifier, FunSig>,
    constructors: HashMap<Identifier, ConstrSig>,
    by_name_types: HashMap<(Identifier, String), Identifier>,
    /// Functions and constructors share the call namespace of a module.
    by_name_callables: HashMap<(Identifier, String), Identifier>,
    pub std: StdLib,
}

impl SymbolTable {
    /// An empty table with the built-in `Std` module preregistered.
    pub fn new() -> Self {
        let mut table = Self {
            next_id: 0,
            names: HashMap::new(),
            modules: HashMap::new(),
            types: HashMap::new(),
            constructors_of: HashMap::new(),
            functions: HashMap::new(),
            constructors: HashMap::new(),
            by_name_types: HashMap::new(),
            by_name_callables: HashMap::new(),
            // Placeholder, replaced right below once ids exist.
            std: StdLib {
                module: Identifier::from_index(0),
                print_int: Identifier::from_index(0),
                print_string: Identifier::from_index(0),
                read_int: Identifier::from_index(0),
                read_string: Identifier::from_index(0),
                int_to_string: Identifier::from_index(0),
                digit_to_string: Identifier::from_index(0),
            },
        };
        table.register_std();
        table
    }

    fn register_std(&mut self) {
        let module = self
            .add_module("Std")
            .expect("Std is the first registered module");
        let mut builtin = |table: &mut Self, name: &str, args: Vec<Type>, ret: Type| {
            table
                .add_function(module, name, args, ret)
                .expect("Std functions are distinct")
        };
        self.std = StdLib {
            module,
            print_int: builtin(self, "printInt", vec![Type::Int], Type::Unit),
            print_string: builtin(self, "printString", vec![Type::String], Type::Unit),
            read_int: builtin(self, "readInt", vec![], Type::Int),
            read_string: builtin(self, "readString", vec![], Type::String),
            int_to_string: builtin(self, "intToString", vec![Type::Int], Type::String),
            digit_to_string: builtin(self, "digitToString", vec![Type::Int], Type::String),
        };
    }

    /// Issue a fresh identifier carrying `name` for debugging and printing.
    pub fn fresh(&mut self, name: &str) -> Identifier {
        let id = Identifier::from_index(self.next_id);
        self.next_id += 1;
        self.names.insert(id, name.to_string());
        id
    }

    pub fn name_of(&self, id: Identifier) -> &str {
        self.names
            .get(&id)
            .map(String::as_str)
            .unwrap_or("<unknown>")
    }

    // ─── Registration (name analysis only) ──────────────────────────────

    /// `None` if a module with this name already exists.
    pub fn add_module(&mut self, name: &str) -> Option<Identifier> {
        if self.modules.contains_key(name) {
            return None;
        }
        let id = self.fresh(name);
        self.modules.insert(name.to_string(), id);
        Some(id)
    }

    /// Register an abstract class. `None` on a duplicate type name.
    pub fn add_abstract_class(&mut self, module: Identifier, name: &str) -> Option<Identifier> {
        let key = (module, name.to_string());
        if self.by_name_types.contains_key(&key) {
            return None;
        }
        let id = self.fresh(name);
        self.types.insert(id, module);
        self.constructors_of.insert(id, Vec::new());
        self.by_name_types.insert(key, id);
        Some(id)
    }

    /// Register a case class: both a type and a constructor under one id.
    /// `None` if either namespace already holds the name.
    pub fn add_constructor(
        &mut self,
        module: Identifier,
        name: &str,
        arg_types: Vec<Type>,
        parent: Identifier,
    ) -> Option<Identifier> {
        let type_key = (module, name.to_string());
        let call_key = (module, name.to_string());
        if self.by_name_types.contains_key(&type_key)
            || self.by_name_callables.contains_key(&call_key)
        {
            return None;
        }
        let id = self.fresh(name);
        let siblings = self
            .constructors_of
            .get_mut(&parent)
            .expect("parent was checked to be an abstract class");
        let index = siblings.len();
        siblings.push(id);
        self.types.insert(id, module);
        self.by_name_types.insert(type_key, id);
        self.by_name_callables.insert(call_key, id);
        self.constructors.insert(
            id,
            ConstrSig {
                arg_types,
                parent,
                index,
            },
        );
        Some(id)
    }

    /// `None` if the module already declares a function or constructor with
    /// this name.
    pub fn add_function(
        &mut self,
        module: Identifier,
        name: &str,
        arg_types: Vec<Type>,
        ret_type: Type,
    ) -> Option<Identifier> {
        let key = (module, name.to_string());
        if self.by_name_callables.contains_key(&key) {
            return None;
        }
        let id = self.fresh(name);
        self.by_name_callables.insert(key, id);
        self.functions.insert(
            id,
            FunSig {
                arg_types,
                ret_type,
                owner: module,
            },
        );
        Some(id)
    }

    // ─── Lookups ─────────────────────────────────────────────────────────

    pub fn module(&self, name: &str) -> Option<Identifier> {
        self.modules.get(name).copied()
    }

    pub fn type_in(&self, module: Identifier, name: &str) -> Option<Identifier> {
        self.by_name_types.get(&(module, name.to_string())).copied()
    }

    /// A function or constructor visible under `name` in `module`.
    pub fn callable_in(&self, module: Identifier, name: &str) -> Option<Identifier> {
        self.by_name_callables
            .get(&(module, name.to_string()))
            .copied()
    }

    pub fn function(&self, id: Identifier) -> Option<&FunSig> {
        self.functions.get(&id)
    }

    pub fn constructor(&self, id: Identifier) -> Option<&ConstrSig> {
        self.constructors.get(&id)
    }

    pub fn is_abstract_class(&self, id: Identifier) -> bool {
        self.constructors_of.contains_key(&id)
    }

    pub fn is_type(&self, id: Identifier) -> bool {
        self.types.contains_key(&id)
    }

    /// Owning module of a type.
    pub fn owner_of_type(&self, id: Identifier) -> Option<Identifier> {
        self.types.get(&id).copied()
    }

    /// Constructors of an abstract class, in declaration order.
    pub fn constructors_of(&self, parent: Identifier) -> &[Identifier] {
        self.constructors_of
            .get(&parent)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Human-readable rendering of a type for error messages.
    pub fn describe(&self, tpe: Type) -> String {
        match tpe {
            Type::Int => "Int".to_string(),
            Type::Boolean => "Boolean".to_string(),
            Type::String => "String".to_string(),
            Type::Unit => "Unit".to_string(),
            Type::Class(id) => self.name_of(id).to_string(),
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
