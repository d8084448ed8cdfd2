/*!

This is the long-form manual for `voter_agreement` and `rfastats`.

## Input format

The vote log is the text dump of the Wikipedia Requests for Adminship elections.
Each vote is a block of `KEY:value` lines, blocks being separated by a blank line:

```text
SRC:Guettarda
TGT:Lord Roem
VOT:1
RES:1
YEA:2013
DAT:19:53, 25 January 2013
TXT:'''Support''' per noms.
```

| key   | meaning                                                   |
|-------|-----------------------------------------------------------|
| `SRC` | the voter (may be empty for anonymous votes)              |
| `TGT` | the candidate                                             |
| `VOT` | `1` support, `0` neutral, `-1` oppose                     |
| `RES` | `1` if the candidate was promoted, anything else if not   |
| `YEA` | the year of the election                                  |
| `DAT` | the date of the vote                                      |
| `TXT` | the comment left with the vote, in wiki markup            |

Consecutive votes for the same candidate form one election. A candidate who appears again
later in the log (after votes for somebody else) is treated as running in a new election. Elections
are numbered from 1 in the order of the log; this is the `electionId` of the reports.

## Agreement statistics

For every pair of voters who took part in the same election, `rfastats` counts:

* `totalVotes` the number of times they voted in the same election
* `agreed` how many of these times they cast exactly the same vote
* `totalBeforeA`, `totalBeforeB` how many of these votes each of them cast at or before
  the date of their own first election as a candidate
* `agreedBeforeA`, `agreedBeforeB` the agreements among those

and the ratios `agreed / totalVotes`, `agreedBeforeA / totalBeforeA` and
`agreedBeforeB / totalBeforeB`. A ratio with nothing to divide by is reported as `NaN`:
it means "no data", not "no agreement".

A few conventions apply:
- a missing vote agrees with nothing, including another missing vote
- a vote without a date, or from someone who never ran, is never "before"
- anonymous votes are not paired, and two votes of the same voter in the same
  election are not paired with each other
- `voterA` is the voter who appeared first in the first election the two shared

## Outputs

`rfastats` writes `agreements.csv`, `elections.csv`, `candidates.csv`, `voters.csv`,
optionally `events.csv` with the cleaned comments, and a `summary.json` with the totals of the run.

*/
