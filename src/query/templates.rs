//! SQL templates for the built-in views.
//!
//! Placeholders use `{{name}}` and are expanded by [`super::format`].
//! Every template lists its columns in the order the view definitions
//! expect; the column counts and diff intervals live next to the templates'
//! users in `view::catalog`.

pub const DATABASES: &str = "SELECT \
    coalesce(datname, '__shared__') AS database, \
    coalesce(xact_commit, 0) AS commits, \
    coalesce(xact_rollback, 0) AS rollbacks, \
    coalesce(blks_read * (current_setting('block_size')::int / 1024), 0) AS reads, \
    coalesce(blks_hit, 0) AS hits, \
    coalesce(tup_returned, 0) AS returned, \
    coalesce(tup_fetched, 0) AS fetched, \
    coalesce(tup_inserted, 0) AS inserts, \
    coalesce(tup_updated, 0) AS updates, \
    coalesce(tup_deleted, 0) AS deletes, \
    coalesce(conflicts, 0) AS conflicts, \
    coalesce(deadlocks, 0) AS deadlocks, \
    coalesce(checksum_failures, 0) AS csum_fails, \
    coalesce(temp_files, 0) AS temp_files, \
    coalesce(temp_bytes / 1024, 0) AS temp_kb, \
    coalesce(blk_read_time, 0)::numeric(20,2) AS read_t, \
    coalesce(blk_write_time, 0)::numeric(20,2) AS write_t, \
    coalesce(date_trunc('seconds', now() - stats_reset)::text, '') AS stats_age \
    FROM pg_stat_database ORDER BY datname DESC";

/// Before 12 there is no `checksum_failures`.
pub const DATABASES_PG11: &str = "SELECT \
    datname AS database, \
    coalesce(xact_commit, 0) AS commits, \
    coalesce(xact_rollback, 0) AS rollbacks, \
    coalesce(blks_read * (current_setting('block_size')::int / 1024), 0) AS reads, \
    coalesce(blks_hit, 0) AS hits, \
    coalesce(tup_returned, 0) AS returned, \
    coalesce(tup_fetched, 0) AS fetched, \
    coalesce(tup_inserted, 0) AS inserts, \
    coalesce(tup_updated, 0) AS updates, \
    coalesce(tup_deleted, 0) AS deletes, \
    coalesce(conflicts, 0) AS conflicts, \
    coalesce(deadlocks, 0) AS deadlocks, \
    coalesce(temp_files, 0) AS temp_files, \
    coalesce(temp_bytes / 1024, 0) AS temp_kb, \
    coalesce(blk_read_time, 0)::numeric(20,2) AS read_t, \
    coalesce(blk_write_time, 0)::numeric(20,2) AS write_t, \
    coalesce(date_trunc('seconds', now() - stats_reset)::text, '') AS stats_age \
    FROM pg_stat_database ORDER BY datname DESC";

pub const REPLICATION: &str = "SELECT \
    pid, \
    coalesce(host(client_addr), 'local') AS client, \
    usename AS user, \
    application_name AS name, \
    state, \
    sync_state AS mode, \
    ({{wal_diff_function}}({{wal_function}}(), '0/0') / 1024)::bigint AS wal_kb, \
    ({{wal_diff_function}}({{wal_function}}(), sent_lsn) / 1024)::bigint AS pending_kb, \
    ({{wal_diff_function}}(sent_lsn, write_lsn) / 1024)::bigint AS write_kb, \
    ({{wal_diff_function}}(write_lsn, flush_lsn) / 1024)::bigint AS flush_kb, \
    ({{wal_diff_function}}(flush_lsn, replay_lsn) / 1024)::bigint AS replay_kb, \
    ({{wal_diff_function}}({{wal_function}}(), replay_lsn) / 1024)::bigint AS total_lag_kb, \
    coalesce(date_trunc('seconds', write_lag), '0 seconds'::interval)::text AS write_lag, \
    coalesce(date_trunc('seconds', flush_lag), '0 seconds'::interval)::text AS flush_lag, \
    coalesce(date_trunc('seconds', replay_lag), '0 seconds'::interval)::text AS replay_lag \
    FROM pg_stat_replication ORDER BY pid DESC";

pub const REPLICATION_EXTENDED: &str = "SELECT \
    pid, \
    coalesce(host(client_addr), 'local') AS client, \
    usename AS user, \
    application_name AS name, \
    state, \
    sync_state AS mode, \
    ({{wal_diff_function}}({{wal_function}}(), '0/0') / 1024)::bigint AS wal_kb, \
    ({{wal_diff_function}}({{wal_function}}(), sent_lsn) / 1024)::bigint AS pending_kb, \
    ({{wal_diff_function}}(sent_lsn, write_lsn) / 1024)::bigint AS write_kb, \
    ({{wal_diff_function}}(write_lsn, flush_lsn) / 1024)::bigint AS flush_kb, \
    ({{wal_diff_function}}(flush_lsn, replay_lsn) / 1024)::bigint AS replay_kb, \
    ({{wal_diff_function}}({{wal_function}}(), replay_lsn) / 1024)::bigint AS total_lag_kb, \
    coalesce(date_trunc('seconds', write_lag), '0 seconds'::interval)::text AS write_lag, \
    coalesce(date_trunc('seconds', flush_lag), '0 seconds'::interval)::text AS flush_lag, \
    coalesce(date_trunc('seconds', replay_lag), '0 seconds'::interval)::text AS replay_lag, \
    (pg_last_committed_xact()).xid::text AS last_xid, \
    coalesce(date_trunc('seconds', now() - (pg_last_committed_xact()).timestamp)::text, '') AS xact_age \
    FROM pg_stat_replication ORDER BY pid DESC";

/// 9.6 and older: `*_location` columns, no lag intervals.
pub const REPLICATION_PG96: &str = "SELECT \
    pid, \
    coalesce(host(client_addr), 'local') AS client, \
    usename AS user, \
    application_name AS name, \
    state, \
    sync_state AS mode, \
    ({{wal_diff_function}}({{wal_function}}(), '0/0') / 1024)::bigint AS wal_kb, \
    ({{wal_diff_function}}({{wal_function}}(), sent_location) / 1024)::bigint AS pending_kb, \
    ({{wal_diff_function}}(sent_location, write_location) / 1024)::bigint AS write_kb, \
    ({{wal_diff_function}}(write_location, flush_location) / 1024)::bigint AS flush_kb, \
    ({{wal_diff_function}}(flush_location, replay_location) / 1024)::bigint AS replay_kb, \
    ({{wal_diff_function}}({{wal_function}}(), replay_location) / 1024)::bigint AS total_lag_kb \
    FROM pg_stat_replication ORDER BY pid DESC";

pub const REPLICATION_PG96_EXTENDED: &str = "SELECT \
    pid, \
    coalesce(host(client_addr), 'local') AS client, \
    usename AS user, \
    application_name AS name, \
    state, \
    sync_state AS mode, \
    ({{wal_diff_function}}({{wal_function}}(), '0/0') / 1024)::bigint AS wal_kb, \
    ({{wal_diff_function}}({{wal_function}}(), sent_location) / 1024)::bigint AS pending_kb, \
    ({{wal_diff_function}}(sent_location, write_location) / 1024)::bigint AS write_kb, \
    ({{wal_diff_function}}(write_location, flush_location) / 1024)::bigint AS flush_kb, \
    ({{wal_diff_function}}(flush_location, replay_location) / 1024)::bigint AS replay_kb, \
    ({{wal_diff_function}}({{wal_function}}(), replay_location) / 1024)::bigint AS total_lag_kb, \
    (pg_last_committed_xact()).xid::text AS last_xid, \
    coalesce(date_trunc('seconds', now() - (pg_last_committed_xact()).timestamp)::text, '') AS xact_age \
    FROM pg_stat_replication ORDER BY pid DESC";

pub const TABLES: &str = "SELECT \
    s.schemaname || '.' || s.relname AS relation, \
    coalesce(s.seq_scan, 0) AS seq_scan, \
    coalesce(s.seq_tup_read, 0) AS seq_read, \
    coalesce(s.idx_scan, 0) AS idx_scan, \
    coalesce(s.idx_tup_fetch, 0) AS idx_fetch, \
    coalesce(s.n_tup_ins, 0) AS inserts, \
    coalesce(s.n_tup_upd, 0) AS updates, \
    coalesce(s.n_tup_del, 0) AS deletes, \
    coalesce(s.n_tup_hot_upd, 0) AS hot_updates, \
    coalesce(i.heap_blks_read, 0) AS heap_read, \
    coalesce(i.heap_blks_hit, 0) AS heap_hit, \
    coalesce(i.idx_blks_read, 0) AS idx_read, \
    coalesce(i.idx_blks_hit, 0) AS idx_hit, \
    coalesce(s.vacuum_count, 0) AS vacuums, \
    coalesce(s.autovacuum_count, 0) AS autovacuums, \
    coalesce(s.analyze_count, 0) AS analyzes, \
    coalesce(s.autoanalyze_count, 0) AS autoanalyzes, \
    coalesce(s.n_live_tup, 0) AS live, \
    coalesce(s.n_dead_tup, 0) AS dead \
    FROM pg_stat_user_tables s JOIN pg_statio_user_tables i USING (relid) \
    ORDER BY 1";

pub const INDEXES: &str = "SELECT \
    s.schemaname || '.' || s.indexrelname AS index, \
    coalesce(s.idx_scan, 0) AS scans, \
    coalesce(s.idx_tup_read, 0) AS tuples_read, \
    coalesce(s.idx_tup_fetch, 0) AS tuples_fetch, \
    coalesce(i.idx_blks_read * (current_setting('block_size')::int / 1024), 0) AS read_kb, \
    coalesce(i.idx_blks_hit * (current_setting('block_size')::int / 1024), 0) AS hit_kb \
    FROM pg_stat_user_indexes s JOIN pg_statio_user_indexes i USING (indexrelid) \
    ORDER BY 1";

pub const SIZES: &str = "SELECT \
    s.schemaname || '.' || s.relname AS relation, \
    pg_total_relation_size(s.relid) / 1024 AS total_kb, \
    pg_relation_size(s.relid) / 1024 AS rel_kb, \
    (pg_total_relation_size(s.relid) - pg_relation_size(s.relid)) / 1024 AS idx_kb, \
    pg_total_relation_size(s.relid) / 1024 AS total_change, \
    pg_relation_size(s.relid) / 1024 AS rel_change, \
    (pg_total_relation_size(s.relid) - pg_relation_size(s.relid)) / 1024 AS idx_change \
    FROM pg_stat_user_tables s ORDER BY 1";

pub const FUNCTIONS: &str = "SELECT \
    funcid, \
    schemaname || '.' || funcname AS function, \
    calls AS total_calls, \
    calls, \
    round(total_time::numeric, 2) AS total_t, \
    round(self_time::numeric, 2) AS self_t, \
    round((total_time / greatest(calls, 1))::numeric, 4) AS avg_total_t, \
    round((self_time / greatest(calls, 1))::numeric, 4) AS avg_self_t \
    FROM pg_stat_user_functions ORDER BY funcid";

pub const PROGRESS_VACUUM: &str = "SELECT \
    a.pid, \
    date_trunc('seconds', clock_timestamp() - a.xact_start)::text AS xact_age, \
    p.datname AS database, \
    p.relid::regclass::text AS relation, \
    coalesce(a.wait_event_type || '.' || a.wait_event, a.state) AS state, \
    p.phase, \
    p.heap_blks_total * (current_setting('block_size')::int / 1024) AS total_kb, \
    p.heap_blks_scanned * (current_setting('block_size')::int / 1024) AS t_scanned_kb, \
    p.heap_blks_vacuumed * (current_setting('block_size')::int / 1024) AS t_vacuumed_kb, \
    p.index_vacuum_count AS idx_vacuums, \
    p.heap_blks_scanned * (current_setting('block_size')::int / 1024) AS scanned_kb, \
    p.heap_blks_vacuumed * (current_setting('block_size')::int / 1024) AS vacuumed_kb, \
    regexp_replace(a.query, '\\s+', ' ', 'g') AS query \
    FROM pg_stat_progress_vacuum p JOIN pg_stat_activity a USING (pid) \
    ORDER BY a.pid DESC";

pub const PROGRESS_CLUSTER: &str = "SELECT \
    a.pid, \
    date_trunc('seconds', clock_timestamp() - a.xact_start)::text AS xact_age, \
    p.datname AS database, \
    p.relid::regclass::text AS relation, \
    coalesce(p.cluster_index_relid::regclass::text, '') AS index, \
    coalesce(a.wait_event_type || '.' || a.wait_event, a.state) AS state, \
    p.phase, \
    p.heap_blks_total * (current_setting('block_size')::int / 1024) AS total_kb, \
    p.heap_blks_scanned * (current_setting('block_size')::int / 1024) AS t_scanned_kb, \
    p.heap_tuples_written AS t_written, \
    p.heap_blks_scanned * (current_setting('block_size')::int / 1024) AS scanned_kb, \
    p.heap_tuples_written AS written, \
    regexp_replace(a.query, '\\s+', ' ', 'g') AS query \
    FROM pg_stat_progress_cluster p JOIN pg_stat_activity a USING (pid) \
    ORDER BY a.pid DESC";

pub const PROGRESS_INDEX: &str = "SELECT \
    a.pid, \
    date_trunc('seconds', clock_timestamp() - a.xact_start)::text AS xact_age, \
    p.datname AS database, \
    p.relid::regclass::text AS relation, \
    coalesce(p.index_relid::regclass::text, '') AS index, \
    a.state, \
    p.phase, \
    p.lockers_done || '/' || p.lockers_total AS lockers, \
    p.blocks_done || '/' || p.blocks_total AS blocks, \
    p.tuples_done || '/' || p.tuples_total AS tuples, \
    p.partitions_done || '/' || p.partitions_total AS partitions, \
    coalesce(a.wait_event_type || '.' || a.wait_event, '') AS waiting, \
    p.command, \
    regexp_replace(a.query, '\\s+', ' ', 'g') AS query \
    FROM pg_stat_progress_create_index p JOIN pg_stat_activity a USING (pid) \
    ORDER BY a.pid DESC";

pub const ACTIVITY: &str = "SELECT \
    pid, \
    coalesce(host(client_addr), 'local') AS client, \
    coalesce(usename, '') AS user, \
    coalesce(datname, '') AS database, \
    coalesce(state, '') AS state, \
    coalesce(wait_event_type, '') AS wait_etype, \
    coalesce(wait_event, '') AS wait_event, \
    coalesce(date_trunc('seconds', clock_timestamp() - xact_start)::text, '') AS xact_age, \
    coalesce(date_trunc('seconds', clock_timestamp() - query_start)::text, '') AS query_age, \
    coalesce(date_trunc('seconds', clock_timestamp() - state_change)::text, '') AS change_age, \
    coalesce(application_name, '') AS application, \
    backend_type, \
    coalesce(age(backend_xid)::text, '') AS xid_age, \
    regexp_replace(query, '\\s+', ' ', 'g') AS query \
    FROM pg_stat_activity \
    WHERE pid <> pg_backend_pid() AND application_name IS DISTINCT FROM '{{application_name}}' \
    ORDER BY pid DESC";

/// 9.6: no `backend_type`.
pub const ACTIVITY_PG96: &str = "SELECT \
    pid, \
    coalesce(host(client_addr), 'local') AS client, \
    coalesce(usename, '') AS user, \
    coalesce(datname, '') AS database, \
    coalesce(state, '') AS state, \
    coalesce(wait_event_type, '') AS wait_etype, \
    coalesce(wait_event, '') AS wait_event, \
    coalesce(date_trunc('seconds', clock_timestamp() - xact_start)::text, '') AS xact_age, \
    coalesce(date_trunc('seconds', clock_timestamp() - query_start)::text, '') AS query_age, \
    coalesce(date_trunc('seconds', clock_timestamp() - state_change)::text, '') AS change_age, \
    coalesce(application_name, '') AS application, \
    coalesce(age(backend_xid)::text, '') AS xid_age, \
    regexp_replace(query, '\\s+', ' ', 'g') AS query \
    FROM pg_stat_activity \
    WHERE pid <> pg_backend_pid() AND application_name IS DISTINCT FROM '{{application_name}}' \
    ORDER BY pid DESC";

/// 9.5 and older: a boolean `waiting` instead of wait events.
pub const ACTIVITY_PG95: &str = "SELECT \
    pid, \
    coalesce(host(client_addr), 'local') AS client, \
    coalesce(usename, '') AS user, \
    coalesce(datname, '') AS database, \
    coalesce(state, '') AS state, \
    waiting::text AS waiting, \
    coalesce(date_trunc('seconds', clock_timestamp() - xact_start)::text, '') AS xact_age, \
    coalesce(date_trunc('seconds', clock_timestamp() - query_start)::text, '') AS query_age, \
    coalesce(date_trunc('seconds', clock_timestamp() - state_change)::text, '') AS change_age, \
    coalesce(application_name, '') AS application, \
    coalesce(age(backend_xid)::text, '') AS xid_age, \
    regexp_replace(query, '\\s+', ' ', 'g') AS query \
    FROM pg_stat_activity \
    WHERE pid <> pg_backend_pid() AND application_name IS DISTINCT FROM '{{application_name}}' \
    ORDER BY pid DESC";

pub const STATEMENTS_TIMINGS: &str = "SELECT \
    r.rolname AS user, \
    d.datname AS database, \
    round((p.total_plan_time + p.total_exec_time)::numeric, 2) AS t_all_t, \
    round(p.blk_read_time::numeric, 2) AS t_read_t, \
    round(p.blk_write_time::numeric, 2) AS t_write_t, \
    round((p.total_plan_time + p.total_exec_time - p.blk_read_time - p.blk_write_time)::numeric, 2) AS t_cpu_t, \
    round((p.total_plan_time + p.total_exec_time)::numeric, 2) AS all_t, \
    round(p.blk_read_time::numeric, 2) AS read_t, \
    round(p.blk_write_time::numeric, 2) AS write_t, \
    round((p.total_plan_time + p.total_exec_time - p.blk_read_time - p.blk_write_time)::numeric, 2) AS cpu_t, \
    p.calls, \
    left(md5(p.userid::text || '.' || p.dbid::text || '.' || p.queryid::text), 10) AS queryid, \
    regexp_replace(p.query, '\\s+', ' ', 'g') AS query \
    FROM pg_stat_statements p \
    JOIN pg_roles r ON r.oid = p.userid \
    JOIN pg_database d ON d.oid = p.dbid \
    ORDER BY 3 DESC";

/// Before 13 there is a single `total_time` and no planning time.
pub const STATEMENTS_TIMINGS_PG12: &str = "SELECT \
    r.rolname AS user, \
    d.datname AS database, \
    round(p.total_time::numeric, 2) AS t_all_t, \
    round(p.blk_read_time::numeric, 2) AS t_read_t, \
    round(p.blk_write_time::numeric, 2) AS t_write_t, \
    round((p.total_time - p.blk_read_time - p.blk_write_time)::numeric, 2) AS t_cpu_t, \
    round(p.total_time::numeric, 2) AS all_t, \
    round(p.blk_read_time::numeric, 2) AS read_t, \
    round(p.blk_write_time::numeric, 2) AS write_t, \
    round((p.total_time - p.blk_read_time - p.blk_write_time)::numeric, 2) AS cpu_t, \
    p.calls, \
    left(md5(p.userid::text || '.' || p.dbid::text || '.' || p.queryid::text), 10) AS queryid, \
    regexp_replace(p.query, '\\s+', ' ', 'g') AS query \
    FROM pg_stat_statements p \
    JOIN pg_roles r ON r.oid = p.userid \
    JOIN pg_database d ON d.oid = p.dbid \
    ORDER BY 3 DESC";

pub const STATEMENTS_GENERAL: &str = "SELECT \
    r.rolname AS user, \
    d.datname AS database, \
    p.calls AS t_calls, \
    p.rows AS t_rows, \
    p.calls, \
    p.rows, \
    left(md5(p.userid::text || '.' || p.dbid::text || '.' || p.queryid::text), 10) AS queryid, \
    regexp_replace(p.query, '\\s+', ' ', 'g') AS query \
    FROM pg_stat_statements p \
    JOIN pg_roles r ON r.oid = p.userid \
    JOIN pg_database d ON d.oid = p.dbid \
    ORDER BY 3 DESC";

pub const STATEMENTS_IO: &str = "SELECT \
    r.rolname AS user, \
    d.datname AS database, \
    p.shared_blks_hit * (current_setting('block_size')::int / 1024) AS t_hit_kb, \
    p.shared_blks_read * (current_setting('block_size')::int / 1024) AS t_read_kb, \
    p.shared_blks_dirtied * (current_setting('block_size')::int / 1024) AS t_dirtied_kb, \
    p.shared_blks_written * (current_setting('block_size')::int / 1024) AS t_written_kb, \
    p.shared_blks_hit * (current_setting('block_size')::int / 1024) AS hit_kb, \
    p.shared_blks_read * (current_setting('block_size')::int / 1024) AS read_kb, \
    p.shared_blks_dirtied * (current_setting('block_size')::int / 1024) AS dirtied_kb, \
    p.shared_blks_written * (current_setting('block_size')::int / 1024) AS written_kb, \
    p.calls, \
    left(md5(p.userid::text || '.' || p.dbid::text || '.' || p.queryid::text), 10) AS queryid, \
    regexp_replace(p.query, '\\s+', ' ', 'g') AS query \
    FROM pg_stat_statements p \
    JOIN pg_roles r ON r.oid = p.userid \
    JOIN pg_database d ON d.oid = p.dbid \
    ORDER BY 3 DESC";

pub const STATEMENTS_TEMP: &str = "SELECT \
    r.rolname AS user, \
    d.datname AS database, \
    p.temp_blks_read * (current_setting('block_size')::int / 1024) AS t_tmp_read_kb, \
    p.temp_blks_written * (current_setting('block_size')::int / 1024) AS t_tmp_write_kb, \
    p.temp_blks_read * (current_setting('block_size')::int / 1024) AS tmp_read_kb, \
    p.temp_blks_written * (current_setting('block_size')::int / 1024) AS tmp_write_kb, \
    p.calls, \
    left(md5(p.userid::text || '.' || p.dbid::text || '.' || p.queryid::text), 10) AS queryid, \
    regexp_replace(p.query, '\\s+', ' ', 'g') AS query \
    FROM pg_stat_statements p \
    JOIN pg_roles r ON r.oid = p.userid \
    JOIN pg_database d ON d.oid = p.dbid \
    ORDER BY 3 DESC";

pub const STATEMENTS_LOCAL: &str = "SELECT \
    r.rolname AS user, \
    d.datname AS database, \
    p.local_blks_hit * (current_setting('block_size')::int / 1024) AS t_hit_kb, \
    p.local_blks_read * (current_setting('block_size')::int / 1024) AS t_read_kb, \
    p.local_blks_dirtied * (current_setting('block_size')::int / 1024) AS t_dirtied_kb, \
    p.local_blks_written * (current_setting('block_size')::int / 1024) AS t_written_kb, \
    p.local_blks_hit * (current_setting('block_size')::int / 1024) AS hit_kb, \
    p.local_blks_read * (current_setting('block_size')::int / 1024) AS read_kb, \
    p.local_blks_dirtied * (current_setting('block_size')::int / 1024) AS dirtied_kb, \
    p.local_blks_written * (current_setting('block_size')::int / 1024) AS written_kb, \
    p.calls, \
    left(md5(p.userid::text || '.' || p.dbid::text || '.' || p.queryid::text), 10) AS queryid, \
    regexp_replace(p.query, '\\s+', ' ', 'g') AS query \
    FROM pg_stat_statements p \
    JOIN pg_roles r ON r.oid = p.userid \
    JOIN pg_database d ON d.oid = p.dbid \
    ORDER BY 3 DESC";
