use sqlparser::dialect::MySqlDialect;

pub static DIALECT_MYSQL: MySqlDialect = MySqlDialect {};
